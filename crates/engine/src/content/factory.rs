use thiserror::Error;

use crate::app::{BehaviorKind, Enemy, EnemyId, Item, Vec2};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {category} type '{type_name}'")]
pub struct UnknownTypeError {
    pub category: &'static str,
    pub type_name: String,
}

impl UnknownTypeError {
    fn new(category: &'static str, type_name: &str) -> Self {
        Self {
            category,
            type_name: type_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyArchetype {
    pub type_name: &'static str,
    pub speed: f32,
    pub damage: i32,
    pub behavior: BehaviorKind,
}

pub const ENEMY_ARCHETYPES: [EnemyArchetype; 3] = [
    EnemyArchetype {
        type_name: "Slime",
        speed: 40.0,
        damage: 10,
        behavior: BehaviorKind::Patrol,
    },
    EnemyArchetype {
        type_name: "Ghost",
        speed: 60.0,
        damage: 20,
        behavior: BehaviorKind::Chase,
    },
    EnemyArchetype {
        type_name: "Skeleton",
        speed: 50.0,
        damage: 15,
        behavior: BehaviorKind::Sentry,
    },
];

pub fn enemy_archetype(type_name: &str) -> Option<&'static EnemyArchetype> {
    ENEMY_ARCHETYPES
        .iter()
        .find(|archetype| archetype.type_name == type_name)
}

/// Builds enemies with their behavior already wired. Ids are unique per factory.
#[derive(Debug, Default)]
pub struct EnemyFactory {
    next_id: EnemyId,
}

impl EnemyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, type_name: &str, position: Vec2) -> Result<Enemy, UnknownTypeError> {
        self.create_with_behavior(type_name, position, None)
    }

    pub fn create_with_behavior(
        &mut self,
        type_name: &str,
        position: Vec2,
        behavior_override: Option<BehaviorKind>,
    ) -> Result<Enemy, UnknownTypeError> {
        let archetype =
            enemy_archetype(type_name).ok_or_else(|| UnknownTypeError::new("enemy", type_name))?;
        let behavior = behavior_override.unwrap_or(archetype.behavior);
        let id = self.next_id;
        self.next_id += 1;
        Ok(Enemy::new(
            id,
            archetype.type_name,
            position,
            archetype.speed,
            archetype.damage,
            behavior.instantiate(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFactory;

impl ItemFactory {
    pub fn create(&self, type_name: &str, position: Vec2) -> Result<Item, UnknownTypeError> {
        match type_name {
            "Coin" => Ok(Item::coin(position)),
            "Chest" => Ok(Item::chest(position)),
            _ => Err(UnknownTypeError::new("item", type_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ItemKind;

    #[test]
    fn ghost_chases_and_others_follow_archetype() {
        let mut factory = EnemyFactory::new();
        let ghost = factory.create("Ghost", Vec2::ZERO).expect("ghost");
        let slime = factory.create("Slime", Vec2::ZERO).expect("slime");
        let skeleton = factory.create("Skeleton", Vec2::ZERO).expect("skeleton");

        assert_eq!(ghost.behavior_kind(), BehaviorKind::Chase);
        assert_eq!(ghost.damage(), 20);
        assert_eq!(slime.behavior_kind(), BehaviorKind::Patrol);
        assert!((slime.speed() - 40.0).abs() < f32::EPSILON);
        assert_eq!(skeleton.behavior_kind(), BehaviorKind::Sentry);
    }

    #[test]
    fn enemy_ids_increment_per_factory() {
        let mut first = EnemyFactory::new();
        let mut second = EnemyFactory::new();
        let a = first.create("Slime", Vec2::ZERO).expect("a");
        let b = first.create("Slime", Vec2::ZERO).expect("b");
        let c = second.create("Slime", Vec2::ZERO).expect("c");

        assert_eq!((a.id(), b.id(), c.id()), (0, 1, 0));
    }

    #[test]
    fn unknown_enemy_type_is_an_error_and_consumes_no_id() {
        let mut factory = EnemyFactory::new();
        let err = factory.create("Dragon", Vec2::ZERO).expect_err("dragon");
        assert_eq!(err.to_string(), "unknown enemy type 'Dragon'");
        assert_eq!(factory.create("Slime", Vec2::ZERO).expect("slime").id(), 0);
    }

    #[test]
    fn behavior_override_replaces_archetype_default() {
        let mut factory = EnemyFactory::new();
        let slime = factory
            .create_with_behavior("Slime", Vec2::ZERO, Some(BehaviorKind::Chase))
            .expect("slime");
        assert_eq!(slime.behavior_kind(), BehaviorKind::Chase);
    }

    #[test]
    fn item_factory_builds_coin_and_chest() {
        let factory = ItemFactory;
        let coin = factory.create("Coin", Vec2::new(4.0, 4.0)).expect("coin");
        let chest = factory.create("Chest", Vec2::ZERO).expect("chest");

        assert_eq!(coin.kind(), ItemKind::Coin);
        assert_eq!(coin.name(), "Gold Coin");
        assert_eq!(chest.id(), 999);
        assert!(factory.create("Potion", Vec2::ZERO).is_err());
    }
}
