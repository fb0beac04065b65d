use super::geometry::{Rect, Vec2};
use super::tilemap::Collider;

pub const PLAYER_SPEED: f32 = 100.0;
pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const INVINCIBILITY_SECONDS: f32 = 1.0;

/// Hitbox inset from the 32x32 sprite box.
pub const PLAYER_BOUNDS_OFFSET_X: i32 = 8;
pub const PLAYER_BOUNDS_OFFSET_Y: i32 = 16;
pub const PLAYER_BOUNDS_SIZE: i32 = 16;

pub const ANIMATION_FRAME_SECONDS: f32 = 0.15;
pub const IDLE_FRAME_COUNT: usize = 4;
pub const MOVE_FRAME_COUNT: usize = 6;

/// Simulation state of the controllable hero.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    position: Vec2,
    speed: f32,
    health: i32,
    score: u32,
    invincibility_timer: f32,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            score: 0,
            invincibility_timer: 0.0,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn invincibility_timer(&self) -> f32 {
        self.invincibility_timer
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    pub fn bounds(&self) -> Rect {
        Self::bounds_at(self.position)
    }

    pub fn bounds_at(position: Vec2) -> Rect {
        Rect::from_position(
            position,
            PLAYER_BOUNDS_OFFSET_X,
            PLAYER_BOUNDS_OFFSET_Y,
            PLAYER_BOUNDS_SIZE,
            PLAYER_BOUNDS_SIZE,
        )
    }

    /// Teleport without collision checks.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Applies damage unless invincible. Returns whether the hit landed.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.invincibility_timer > 0.0 {
            return false;
        }
        self.health -= amount;
        self.invincibility_timer = INVINCIBILITY_SECONDS;
        true
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn clear_invincibility(&mut self) {
        self.invincibility_timer = 0.0;
    }

    pub fn restore_progress(&mut self, position: Vec2, score: u32) {
        self.position = position;
        self.score = score;
    }

    /// Advances timers and moves along `direction`, resolving each axis separately.
    ///
    /// X is tried first at the current Y, then Y at the resulting X. Without a collider
    /// the move is unconstrained.
    pub fn update(&mut self, dt: f32, direction: Vec2, collider: Option<&dyn Collider>) {
        self.invincibility_timer = (self.invincibility_timer - dt).max(0.0);

        if direction.is_zero() {
            return;
        }
        let candidate = self.position + direction * (self.speed * dt);
        let Some(collider) = collider else {
            self.position = candidate;
            return;
        };

        let x_only = Vec2::new(candidate.x, self.position.y);
        if !collider.is_colliding(Self::bounds_at(x_only)) {
            self.position.x = candidate.x;
        }
        let y_only = Vec2::new(self.position.x, candidate.y);
        if !collider.is_colliding(Self::bounds_at(y_only)) {
            self.position.y = candidate.y;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Down,
    Up,
    Left,
    Right,
}

/// Animation bookkeeping for the player sprite. Never feeds back into simulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPresentation {
    facing: Facing,
    moving: bool,
    frame: usize,
    frame_timer: f32,
}

impl PlayerPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn update(&mut self, dt: f32, direction: Vec2) {
        let moving = !direction.is_zero();
        if direction.y > 0.0 {
            self.facing = Facing::Down;
        } else if direction.y < 0.0 {
            self.facing = Facing::Up;
        } else if direction.x > 0.0 {
            self.facing = Facing::Right;
        } else if direction.x < 0.0 {
            self.facing = Facing::Left;
        }

        if moving != self.moving {
            self.moving = moving;
            self.frame = 0;
            self.frame_timer = 0.0;
        }

        self.frame_timer += dt;
        if self.frame_timer >= ANIMATION_FRAME_SECONDS {
            self.frame_timer = 0.0;
            self.frame = (self.frame + 1) % self.frame_count();
        }
    }

    pub fn frame_count(&self) -> usize {
        if self.moving {
            MOVE_FRAME_COUNT
        } else {
            IDLE_FRAME_COUNT
        }
    }

    pub fn animation_name(&self) -> &'static str {
        match (self.facing, self.moving) {
            (Facing::Down, true) => "Down",
            (Facing::Down, false) => "Down_Idle",
            (Facing::Up, true) => "Up",
            (Facing::Up, false) => "Up_Idle",
            (Facing::Left | Facing::Right, true) => "Side",
            (Facing::Left | Facing::Right, false) => "Side_Idle",
        }
    }

    /// Side sprites face left; right-facing reuses them mirrored.
    pub fn flip_horizontal(&self) -> bool {
        self.facing == Facing::Right
    }

    /// Damage blink: hidden on even tenths of the remaining invincibility.
    pub fn is_visible(player: &Player) -> bool {
        let timer = player.invincibility_timer();
        timer <= 0.0 || (timer * 10.0) as i32 % 2 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tilemap::Tilemap;

    struct WallsAt(Vec<Rect>);

    impl Collider for WallsAt {
        fn is_colliding(&self, bounds: Rect) -> bool {
            self.0.iter().any(|wall| wall.intersects(&bounds))
        }
    }

    #[test]
    fn take_damage_while_invincible_changes_nothing() {
        let mut player = Player::new(Vec2::ZERO);
        assert!(player.take_damage(20));
        let timer = player.invincibility_timer();

        assert!(!player.take_damage(20));
        assert_eq!(player.health(), 80);
        assert!((player.invincibility_timer() - timer).abs() < f32::EPSILON);
    }

    #[test]
    fn take_damage_may_drive_health_negative() {
        let mut player = Player::new(Vec2::ZERO);
        player.take_damage(150);
        assert_eq!(player.health(), -50);
        assert!(!player.is_alive());
    }

    #[test]
    fn invincibility_counts_down_and_floors_at_zero() {
        let mut player = Player::new(Vec2::ZERO);
        player.take_damage(10);
        player.update(0.75, Vec2::ZERO, None);
        assert!((player.invincibility_timer() - 0.25).abs() < 0.0001);
        player.update(0.5, Vec2::ZERO, None);
        assert_eq!(player.invincibility_timer(), 0.0);
        assert!(player.take_damage(10));
    }

    #[test]
    fn bounds_are_inset_from_position() {
        let player = Player::new(Vec2::new(10.0, 20.0));
        assert_eq!(player.bounds(), Rect::new(18, 36, 16, 16));
    }

    #[test]
    fn moves_freely_without_collider() {
        let mut player = Player::new(Vec2::ZERO);
        player.update(0.5, Vec2::new(1.0, 0.0), None);
        assert!((player.position().x - 50.0).abs() < 0.0001);
        assert_eq!(player.position().y, 0.0);
    }

    #[test]
    fn blocked_x_still_allows_y() {
        // Wall directly to the right of the hitbox.
        let walls = WallsAt(vec![Rect::new(24, -100, 16, 300)]);
        let mut player = Player::new(Vec2::ZERO);
        let diagonal = Vec2::new(1.0, 1.0).normalized_or_zero();

        player.update(0.1, diagonal, Some(&walls));

        assert_eq!(player.position().x, 0.0);
        assert!(player.position().y > 0.0);
    }

    #[test]
    fn blocked_y_still_allows_x() {
        // Floor directly below the hitbox.
        let walls = WallsAt(vec![Rect::new(-100, 32, 300, 16)]);
        let mut player = Player::new(Vec2::ZERO);
        let diagonal = Vec2::new(1.0, 1.0).normalized_or_zero();

        player.update(0.1, diagonal, Some(&walls));

        assert!(player.position().x > 0.0);
        assert_eq!(player.position().y, 0.0);
    }

    #[test]
    fn slides_down_along_a_tilemap_wall_column() {
        // 6x6 floor with a wall column at x=3 (pixels 48..64).
        #[rustfmt::skip]
        let tiles = vec![
            0, 0, 0, 1, 0, 0,
            0, 0, 0, 1, 0, 0,
            0, 0, 0, 1, 0, 0,
            0, 0, 0, 1, 0, 0,
            0, 0, 0, 1, 0, 0,
            0, 0, 0, 1, 0, 0,
        ];
        let tilemap = Tilemap::new(6, 6, 16, Vec2::ZERO, tiles).expect("tilemap");
        // Hitbox spans x 28..44, so any step right reaches the wall.
        let mut player = Player::new(Vec2::new(20.0, 0.0));
        let diagonal = Vec2::new(1.0, 1.0).normalized_or_zero();

        for _ in 0..5 {
            player.update(0.1, diagonal, Some(&tilemap));
        }

        assert_eq!(player.position().x, 20.0);
        assert!((player.position().y - 35.355).abs() < 0.01);
        assert!(player.bounds().right() <= 48);
        assert!(!tilemap.is_colliding(player.bounds()));
    }

    #[test]
    fn restore_progress_sets_position_and_score() {
        let mut player = Player::new(Vec2::ZERO);
        player.add_score(30);
        player.restore_progress(Vec2::new(5.0, 6.0), 70);
        assert_eq!(player.position(), Vec2::new(5.0, 6.0));
        assert_eq!(player.score(), 70);
    }

    #[test]
    fn presentation_defaults_to_down_idle() {
        let presentation = PlayerPresentation::new();
        assert_eq!(presentation.animation_name(), "Down_Idle");
        assert_eq!(presentation.frame_count(), IDLE_FRAME_COUNT);
        assert!(!presentation.flip_horizontal());
    }

    #[test]
    fn presentation_vertical_axis_wins_facing() {
        let mut presentation = PlayerPresentation::new();
        presentation.update(0.01, Vec2::new(0.7, -0.7));
        assert_eq!(presentation.facing(), Facing::Up);
        assert_eq!(presentation.animation_name(), "Up");
    }

    #[test]
    fn presentation_flips_when_facing_right() {
        let mut presentation = PlayerPresentation::new();
        presentation.update(0.01, Vec2::new(1.0, 0.0));
        assert_eq!(presentation.animation_name(), "Side");
        assert!(presentation.flip_horizontal());

        presentation.update(0.01, Vec2::ZERO);
        assert_eq!(presentation.animation_name(), "Side_Idle");
        assert!(presentation.flip_horizontal());
    }

    #[test]
    fn presentation_frame_resets_on_state_change() {
        let mut presentation = PlayerPresentation::new();
        presentation.update(0.2, Vec2::ZERO);
        assert_eq!(presentation.frame(), 1);

        presentation.update(0.01, Vec2::new(0.0, 1.0));
        assert_eq!(presentation.frame(), 0);
        assert_eq!(presentation.frame_count(), MOVE_FRAME_COUNT);
    }

    #[test]
    fn presentation_frame_wraps_at_frame_count() {
        let mut presentation = PlayerPresentation::new();
        for _ in 0..IDLE_FRAME_COUNT {
            presentation.update(0.15, Vec2::ZERO);
        }
        assert_eq!(presentation.frame(), 0);
    }

    #[test]
    fn blink_hides_player_on_even_tenths() {
        let mut player = Player::new(Vec2::ZERO);
        assert!(PlayerPresentation::is_visible(&player));

        player.take_damage(1);
        // timer 1.0 -> (10) even -> hidden
        assert!(!PlayerPresentation::is_visible(&player));
        player.update(0.125, Vec2::ZERO, None);
        // timer 0.875 -> (8) even -> hidden
        assert!(!PlayerPresentation::is_visible(&player));
        player.update(0.125, Vec2::ZERO, None);
        // timer 0.75 -> (7) odd -> visible
        assert!(PlayerPresentation::is_visible(&player));
    }
}
