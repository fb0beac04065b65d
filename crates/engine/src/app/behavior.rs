use std::fmt;
use std::str::FromStr;

use super::enemy::EnemyState;
use super::geometry::Vec2;
use super::player::Player;

pub const PATROL_REVERSE_SECONDS: f32 = 2.0;
pub const CHASE_SPEED_FACTOR: f32 = 0.8;
pub const SENTRY_ALERT_RADIUS: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Patrol,
    Chase,
    Sentry,
}

impl BehaviorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorKind::Patrol => "patrol",
            BehaviorKind::Chase => "chase",
            BehaviorKind::Sentry => "sentry",
        }
    }

    pub fn instantiate(self) -> Box<dyn EnemyBehavior> {
        match self {
            BehaviorKind::Patrol => Box::new(PatrolBehavior::new()),
            BehaviorKind::Chase => Box::new(ChaseBehavior),
            BehaviorKind::Sentry => Box::new(SentryBehavior::new()),
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patrol" => Ok(BehaviorKind::Patrol),
            "chase" => Ok(BehaviorKind::Chase),
            "sentry" => Ok(BehaviorKind::Sentry),
            _ => Err(()),
        }
    }
}

/// What the enemy should do with its behavior after a step.
#[derive(Debug)]
pub enum BehaviorCommand {
    Keep,
    SwitchTo(Box<dyn EnemyBehavior>),
}

/// Movement policy for one enemy. Owned by the enemy and replaceable at runtime.
pub trait EnemyBehavior: fmt::Debug {
    fn kind(&self) -> BehaviorKind;

    fn update(&mut self, enemy: &mut EnemyState, player: &Player, dt: f32) -> BehaviorCommand;
}

/// Walks back and forth along X, reversing every two seconds. Ignores the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolBehavior {
    // f64 so that summing f32 steps which divide the period lands on it exactly.
    timer: f64,
    direction: Vec2,
}

impl PatrolBehavior {
    pub fn new() -> Self {
        Self {
            timer: 0.0,
            direction: Vec2::new(1.0, 0.0),
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    fn step(&mut self, enemy: &mut EnemyState, dt: f32) {
        self.timer += f64::from(dt);
        if self.timer >= f64::from(PATROL_REVERSE_SECONDS) {
            self.direction = -self.direction;
            self.timer = 0.0;
        }
        enemy.position += self.direction * (enemy.speed * dt);
    }
}

impl Default for PatrolBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyBehavior for PatrolBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Patrol
    }

    fn update(&mut self, enemy: &mut EnemyState, _player: &Player, dt: f32) -> BehaviorCommand {
        self.step(enemy, dt);
        BehaviorCommand::Keep
    }
}

/// Heads straight for the player at reduced speed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChaseBehavior;

impl EnemyBehavior for ChaseBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Chase
    }

    fn update(&mut self, enemy: &mut EnemyState, player: &Player, dt: f32) -> BehaviorCommand {
        let direction = (player.position() - enemy.position).normalized_or_zero();
        enemy.position += direction * (enemy.speed * CHASE_SPEED_FACTOR * dt);
        BehaviorCommand::Keep
    }
}

/// Patrols until the player comes within the alert radius, then asks to become a chaser.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryBehavior {
    patrol: PatrolBehavior,
    alert_radius: f32,
}

impl SentryBehavior {
    pub fn new() -> Self {
        Self::with_alert_radius(SENTRY_ALERT_RADIUS)
    }

    pub fn with_alert_radius(alert_radius: f32) -> Self {
        Self {
            patrol: PatrolBehavior::new(),
            alert_radius,
        }
    }
}

impl Default for SentryBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyBehavior for SentryBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Sentry
    }

    fn update(&mut self, enemy: &mut EnemyState, player: &Player, dt: f32) -> BehaviorCommand {
        self.patrol.step(enemy, dt);
        let distance = (player.position() - enemy.position).length();
        if distance <= self.alert_radius {
            return BehaviorCommand::SwitchTo(Box::new(ChaseBehavior));
        }
        BehaviorCommand::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy_at(position: Vec2, speed: f32) -> EnemyState {
        EnemyState {
            id: 1,
            position,
            speed,
            damage: 10,
        }
    }

    #[test]
    fn patrol_reverses_twice_in_four_seconds_with_zero_net_displacement() {
        let mut behavior = PatrolBehavior::new();
        let mut enemy = enemy_at(Vec2::new(100.0, 50.0), 40.0);
        let player = Player::new(Vec2::ZERO);
        let dt = 0.25;

        let mut reversals = 0;
        let mut last_direction = behavior.direction();
        for _ in 0..16 {
            behavior.update(&mut enemy, &player, dt);
            if behavior.direction() != last_direction {
                reversals += 1;
                last_direction = behavior.direction();
            }
        }

        assert_eq!(reversals, 2);
        assert!((enemy.position.x - 100.0).abs() < 0.001);
        assert_eq!(enemy.position.y, 50.0);
    }

    #[test]
    fn patrol_handles_non_dyadic_steps() {
        let mut behavior = PatrolBehavior::new();
        let mut enemy = enemy_at(Vec2::ZERO, 30.0);
        let player = Player::new(Vec2::ZERO);

        let mut reversals = 0;
        let mut last_direction = behavior.direction();
        for _ in 0..40 {
            behavior.update(&mut enemy, &player, 0.1);
            if behavior.direction() != last_direction {
                reversals += 1;
                last_direction = behavior.direction();
            }
        }

        assert_eq!(reversals, 2);
        assert!(enemy.position.x.abs() < 0.01);
    }

    #[test]
    fn patrol_does_not_reverse_just_short_of_the_period() {
        let mut behavior = PatrolBehavior::new();
        let mut enemy = enemy_at(Vec2::ZERO, 30.0);
        let player = Player::new(Vec2::ZERO);
        let dt = 0.66665;

        for _ in 0..3 {
            behavior.update(&mut enemy, &player, dt);
        }
        assert_eq!(behavior.direction(), Vec2::new(1.0, 0.0));
        assert!((enemy.position.x - 3.0 * dt * 30.0).abs() < 0.001);

        behavior.update(&mut enemy, &player, dt);
        assert_eq!(behavior.direction(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn patrol_starts_moving_right() {
        let mut behavior = PatrolBehavior::new();
        let mut enemy = enemy_at(Vec2::ZERO, 40.0);
        behavior.update(&mut enemy, &Player::new(Vec2::ZERO), 0.5);
        assert!((enemy.position.x - 20.0).abs() < 0.0001);
    }

    #[test]
    fn chase_step_is_bounded_by_reduced_speed() {
        let mut behavior = ChaseBehavior;
        let start = Vec2::new(0.0, 0.0);
        let mut enemy = enemy_at(start, 60.0);
        let player = Player::new(Vec2::new(300.0, 400.0));
        let dt = 0.125;

        behavior.update(&mut enemy, &player, dt);

        let moved = (enemy.position - start).length();
        assert!(moved <= CHASE_SPEED_FACTOR * 60.0 * dt + 0.0001);
        assert!((enemy.position.x - 3.6).abs() < 0.0001);
        assert!((enemy.position.y - 4.8).abs() < 0.0001);
    }

    #[test]
    fn chase_on_coincident_positions_does_not_move() {
        let mut behavior = ChaseBehavior;
        let mut enemy = enemy_at(Vec2::new(5.0, 5.0), 60.0);
        let player = Player::new(Vec2::new(5.0, 5.0));

        behavior.update(&mut enemy, &player, 0.25);

        assert_eq!(enemy.position, Vec2::new(5.0, 5.0));
        assert!(enemy.position.is_finite());
    }

    #[test]
    fn sentry_keeps_patrolling_while_player_is_far() {
        let mut behavior = SentryBehavior::new();
        let mut enemy = enemy_at(Vec2::ZERO, 40.0);
        let player = Player::new(Vec2::new(500.0, 0.0));

        let command = behavior.update(&mut enemy, &player, 0.25);

        assert!(matches!(command, BehaviorCommand::Keep));
        assert!((enemy.position.x - 10.0).abs() < 0.0001);
    }

    #[test]
    fn sentry_requests_chase_when_player_is_near() {
        let mut behavior = SentryBehavior::new();
        let mut enemy = enemy_at(Vec2::ZERO, 40.0);
        let player = Player::new(Vec2::new(60.0, 0.0));

        let command = behavior.update(&mut enemy, &player, 0.25);

        match command {
            BehaviorCommand::SwitchTo(next) => assert_eq!(next.kind(), BehaviorKind::Chase),
            BehaviorCommand::Keep => panic!("expected switch"),
        }
    }

    #[test]
    fn behavior_kind_parses_case_insensitively() {
        assert_eq!("Chase".parse::<BehaviorKind>(), Ok(BehaviorKind::Chase));
        assert_eq!(" sentry ".parse::<BehaviorKind>(), Ok(BehaviorKind::Sentry));
        assert!("wander".parse::<BehaviorKind>().is_err());
        assert_eq!(BehaviorKind::Patrol.instantiate().kind(), BehaviorKind::Patrol);
    }
}
