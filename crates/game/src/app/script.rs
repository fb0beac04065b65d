use dungeon_engine::{InputAction, InputSnapshot, InputSource, InputTracker};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("step {index} is empty")]
    EmptyStep { index: usize },
    #[error("step {index}: unknown action '{token}'")]
    UnknownAction { index: usize, token: String },
    #[error("step {index}: invalid repeat count '{count}'")]
    InvalidCount { index: usize, count: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScriptStep {
    held: Vec<InputAction>,
    ticks: u32,
}

/// Replays a comma-separated input program, one step per tick.
///
/// A step is a `+`-joined set of actions held for that tick, with an optional `*count`
/// repeat: `E*60,N+E*10,_,P,_,P,SAVE`. `_` is an idle tick. An action held across
/// consecutive steps is pressed once, so repeated one-shot actions need an idle step
/// between them. Once the program runs out, every tick requests quit.
#[derive(Debug)]
pub(crate) struct ScriptedInput {
    steps: Vec<ScriptStep>,
    cursor: usize,
    ticks_into_step: u32,
    tracker: InputTracker,
}

impl ScriptedInput {
    pub(crate) fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();
        let trimmed = source.trim();
        if !trimmed.is_empty() {
            for (index, raw_step) in trimmed.split(',').enumerate() {
                steps.push(parse_step(index, raw_step.trim())?);
            }
        }
        Ok(Self {
            steps,
            cursor: 0,
            ticks_into_step: 0,
            tracker: InputTracker::new(),
        })
    }

    pub(crate) fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.ticks)).sum()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

impl InputSource for ScriptedInput {
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        match self.steps.get(self.cursor) {
            Some(step) => {
                for action in InputAction::ALL {
                    self.tracker.set_action(action, step.held.contains(&action));
                }
                self.ticks_into_step += 1;
                if self.ticks_into_step >= step.ticks {
                    self.cursor += 1;
                    self.ticks_into_step = 0;
                }
            }
            None => {
                self.tracker.release_all();
                self.tracker.press(InputAction::Quit);
            }
        }
        self.tracker.snapshot_for_tick()
    }
}

fn parse_step(index: usize, raw: &str) -> Result<ScriptStep, ScriptError> {
    if raw.is_empty() {
        return Err(ScriptError::EmptyStep { index });
    }
    let (actions, ticks) = match raw.split_once('*') {
        Some((actions, count)) => {
            let ticks = count
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|ticks| *ticks > 0)
                .ok_or_else(|| ScriptError::InvalidCount {
                    index,
                    count: count.trim().to_string(),
                })?;
            (actions.trim(), ticks)
        }
        None => (raw, 1),
    };

    let mut held = Vec::new();
    for token in actions.split('+').map(str::trim) {
        if let Some(action) = parse_action(index, token)? {
            if !held.contains(&action) {
                held.push(action);
            }
        }
    }
    Ok(ScriptStep { held, ticks })
}

fn parse_action(index: usize, token: &str) -> Result<Option<InputAction>, ScriptError> {
    let action = match token.to_ascii_uppercase().as_str() {
        "_" | "IDLE" => return Ok(None),
        "N" | "UP" => InputAction::MoveUp,
        "S" | "DOWN" => InputAction::MoveDown,
        "W" | "LEFT" => InputAction::MoveLeft,
        "E" | "RIGHT" => InputAction::MoveRight,
        "P" | "PAUSE" => InputAction::Pause,
        "SAVE" => InputAction::Save,
        "LOAD" => InputAction::Load,
        "Q" | "QUIT" => InputAction::Quit,
        _ => {
            return Err(ScriptError::UnknownAction {
                index,
                token: token.to_string(),
            })
        }
    };
    Ok(Some(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_counts_expand_to_ticks() {
        let mut input = ScriptedInput::parse("E*3, N+W").expect("script");
        assert_eq!(input.total_ticks(), 4);

        for _ in 0..3 {
            let snapshot = input.snapshot_for_tick();
            assert!(snapshot.is_down(InputAction::MoveRight));
        }
        let diagonal = input.snapshot_for_tick();
        assert!(diagonal.is_down(InputAction::MoveUp));
        assert!(diagonal.is_down(InputAction::MoveLeft));
        assert!(!diagonal.is_down(InputAction::MoveRight));
        assert!(input.is_finished());
    }

    #[test]
    fn held_action_is_pressed_only_on_first_tick() {
        let mut input = ScriptedInput::parse("P,P,_,P").expect("script");
        let pressed: Vec<bool> = (0..4)
            .map(|_| input.snapshot_for_tick().just_pressed(InputAction::Pause))
            .collect();
        assert_eq!(pressed, vec![true, false, false, true]);
    }

    #[test]
    fn exhausted_script_requests_quit() {
        let mut input = ScriptedInput::parse("_").expect("script");
        assert!(!input.snapshot_for_tick().quit_requested());
        assert!(input.snapshot_for_tick().quit_requested());
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn empty_script_quits_immediately() {
        let mut input = ScriptedInput::parse("   ").expect("script");
        assert!(input.is_finished());
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn actions_are_case_insensitive() {
        let mut input = ScriptedInput::parse("save,_,load").expect("script");
        assert!(input.snapshot_for_tick().just_pressed(InputAction::Save));
        input.snapshot_for_tick();
        assert!(input.snapshot_for_tick().just_pressed(InputAction::Load));
    }

    #[test]
    fn malformed_steps_report_their_index() {
        assert_eq!(
            ScriptedInput::parse("E,,N").expect_err("empty"),
            ScriptError::EmptyStep { index: 1 }
        );
        assert_eq!(
            ScriptedInput::parse("E*0").expect_err("zero"),
            ScriptError::InvalidCount {
                index: 0,
                count: "0".to_string()
            }
        );
        assert_eq!(
            ScriptedInput::parse("E,JUMP").expect_err("unknown"),
            ScriptError::UnknownAction {
                index: 1,
                token: "JUMP".to_string()
            }
        );
    }
}
