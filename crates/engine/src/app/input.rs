use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Pause,
    Save,
    Load,
    Quit,
}

const ACTION_COUNT: usize = 8;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Pause,
        InputAction::Save,
        InputAction::Load,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Pause => 4,
            InputAction::Save => 5,
            InputAction::Load => 6,
            InputAction::Quit => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

/// Input state for one simulation tick: which actions are held and which went down this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: ActionStates,
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    /// True only on the tick the action transitioned from up to down.
    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn quit_requested(&self) -> bool {
        self.just_pressed(InputAction::Quit) || self.is_down(InputAction::Quit)
    }

    /// Held movement keys combined into a unit vector. Up is negative `y`.
    pub fn movement_direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.is_down(InputAction::MoveUp) {
            direction.y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            direction.y += 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            direction.x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            direction.x += 1.0;
        }
        direction.normalized_or_zero()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.pressed.set(action, pressed);
        self
    }
}

/// Per-tick input provider consumed by the headless loop.
pub trait InputSource {
    fn snapshot_for_tick(&mut self) -> InputSnapshot;
}

/// Turns press/release events into per-tick snapshots with edge detection.
///
/// A held action produces exactly one pressed edge until it is released again.
#[derive(Debug, Default)]
pub struct InputTracker {
    held: ActionStates,
    pressed_edges: ActionStates,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: InputAction) {
        self.set_action(action, true);
    }

    pub fn release(&mut self, action: InputAction) {
        self.set_action(action, false);
    }

    pub fn set_action(&mut self, action: InputAction, is_down: bool) {
        if is_down && !self.held.is_down(action) {
            self.pressed_edges.set(action, true);
        }
        self.held.set(action, is_down);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }
}

impl InputSource for InputTracker {
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            held: self.held,
            pressed: self.pressed_edges,
        };
        self.pressed_edges.clear();
        snapshot
    }
}
