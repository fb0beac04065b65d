use tracing::debug;

use super::behavior::{BehaviorCommand, BehaviorKind, EnemyBehavior};
use super::geometry::{Rect, Vec2};
use super::player::{Player, PLAYER_BOUNDS_OFFSET_X, PLAYER_BOUNDS_OFFSET_Y, PLAYER_BOUNDS_SIZE};

pub type EnemyId = u32;

/// The part of an enemy a behavior is allowed to touch.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyState {
    pub id: EnemyId,
    pub position: Vec2,
    pub speed: f32,
    pub damage: i32,
}

#[derive(Debug)]
pub struct Enemy {
    state: EnemyState,
    type_name: String,
    behavior: Box<dyn EnemyBehavior>,
}

impl Enemy {
    pub fn new(
        id: EnemyId,
        type_name: impl Into<String>,
        position: Vec2,
        speed: f32,
        damage: i32,
        behavior: Box<dyn EnemyBehavior>,
    ) -> Self {
        Self {
            state: EnemyState {
                id,
                position,
                speed,
                damage,
            },
            type_name: type_name.into(),
            behavior,
        }
    }

    pub fn id(&self) -> EnemyId {
        self.state.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.state.position = position;
    }

    pub fn speed(&self) -> f32 {
        self.state.speed
    }

    pub fn damage(&self) -> i32 {
        self.state.damage
    }

    pub fn state(&self) -> &EnemyState {
        &self.state
    }

    /// Same sprite box and hitbox inset as the player.
    pub fn bounds(&self) -> Rect {
        Rect::from_position(
            self.state.position,
            PLAYER_BOUNDS_OFFSET_X,
            PLAYER_BOUNDS_OFFSET_Y,
            PLAYER_BOUNDS_SIZE,
            PLAYER_BOUNDS_SIZE,
        )
    }

    pub fn behavior_kind(&self) -> BehaviorKind {
        self.behavior.kind()
    }

    pub fn set_behavior(&mut self, behavior: Box<dyn EnemyBehavior>) {
        self.behavior = behavior;
    }

    /// Runs one behavior step. Returns the new behavior kind if the behavior asked to be replaced.
    pub fn update(&mut self, dt: f32, player: &Player) -> Option<BehaviorKind> {
        match self.behavior.update(&mut self.state, player, dt) {
            BehaviorCommand::Keep => None,
            BehaviorCommand::SwitchTo(next) => {
                let from = self.behavior.kind();
                let to = next.kind();
                self.behavior = next;
                debug!(
                    enemy_id = self.state.id,
                    from = %from,
                    to = %to,
                    "enemy_behavior_switched"
                );
                Some(to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::behavior::{ChaseBehavior, PatrolBehavior, SentryBehavior};

    #[test]
    fn bounds_use_player_style_inset() {
        let enemy = Enemy::new(
            3,
            "Slime",
            Vec2::new(40.0, 10.0),
            40.0,
            10,
            Box::new(PatrolBehavior::new()),
        );
        assert_eq!(enemy.bounds(), Rect::new(48, 26, 16, 16));
    }

    #[test]
    fn behavior_can_be_swapped_at_runtime() {
        let patrol = Box::new(PatrolBehavior::new());
        let mut enemy = Enemy::new(1, "Slime", Vec2::ZERO, 40.0, 10, patrol);
        let player = Player::new(Vec2::new(0.0, 100.0));

        enemy.set_behavior(Box::new(ChaseBehavior));
        enemy.update(0.5, &player);

        assert_eq!(enemy.behavior_kind(), BehaviorKind::Chase);
        assert_eq!(enemy.position().x, 0.0);
        assert!((enemy.position().y - 16.0).abs() < 0.0001);
    }

    #[test]
    fn sentry_switch_is_applied_after_step() {
        let sentry = Box::new(SentryBehavior::new());
        let mut enemy = Enemy::new(2, "Skeleton", Vec2::ZERO, 50.0, 15, sentry);
        let player = Player::new(Vec2::new(30.0, 0.0));

        let switched = enemy.update(0.125, &player);

        assert_eq!(switched, Some(BehaviorKind::Chase));
        assert_eq!(enemy.behavior_kind(), BehaviorKind::Chase);
        assert_eq!(enemy.update(0.125, &player), None);
    }
}
