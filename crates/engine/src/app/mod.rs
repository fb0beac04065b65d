mod audio;
mod behavior;
mod dungeon;
mod enemy;
mod geometry;
mod input;
mod item;
mod loop_runner;
mod persistence;
mod player;
mod render;
mod room;
mod simulation;
mod tilemap;

pub use audio::{AudioCue, AudioSink, NullAudio};
pub use behavior::{
    BehaviorCommand, BehaviorKind, ChaseBehavior, EnemyBehavior, PatrolBehavior, SentryBehavior,
    CHASE_SPEED_FACTOR, PATROL_REVERSE_SECONDS, SENTRY_ALERT_RADIUS,
};
pub use dungeon::{Dungeon, DungeonBuilder, DungeonError};
pub use enemy::{Enemy, EnemyId, EnemyState};
pub use geometry::{Rect, Vec2, MAX_WORLD_COORD};
pub use input::{InputAction, InputSnapshot, InputSource, InputTracker};
pub use item::{
    DecorObject, Item, ItemId, ItemKind, CHEST_ITEM_ID, COIN_ITEM_ID, DEFAULT_ITEM_VALUE,
    ITEM_SIZE_PX,
};
pub use loop_runner::{
    clock_for, run_headless, AppError, ClockMode, FrameClock, LoopConfig, RealtimeClock,
    RunSummary, SteppedClock, StopReason,
};
pub use persistence::{
    encode_save_json, parse_save_json, JsonSaveStore, MemorySaveStore, SaveError, SaveRecord,
    SaveStore, SavedVec2, SAVE_FILE_NAME, SAVE_VERSION,
};
pub use player::{
    Facing, Player, PlayerPresentation, INVINCIBILITY_SECONDS, PLAYER_BOUNDS_OFFSET_X,
    PLAYER_BOUNDS_OFFSET_Y, PLAYER_BOUNDS_SIZE, PLAYER_MAX_HEALTH, PLAYER_SPEED,
};
pub use render::{DrawCommand, DrawRecorder, DrawSink};
pub use room::{Direction, EnemyHit, ItemPickup, Room, RoomId, RoomTickOutcome, UnknownDirection};
pub use simulation::{SessionState, Simulation, SimulationServices, TickReport};
pub use tilemap::{
    Collider, Doorway, Tilemap, TilemapError, DEFAULT_TILE_SIZE_PX, FLOOR_TILE_ID, MAX_TILE_SIZE_PX,
    WALL_TILE_ID,
};
