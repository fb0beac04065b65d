pub(crate) mod atomic_io;
mod factory;
mod hashing;
mod layout;

pub use factory::{
    enemy_archetype, EnemyArchetype, EnemyFactory, ItemFactory, UnknownTypeError, ENEMY_ARCHETYPES,
};
pub use hashing::fingerprint_layout;
pub use layout::{
    load_layout_file, parse_layout, DungeonLayout, LayoutError, LayoutErrorCode, SourceLocation,
};
