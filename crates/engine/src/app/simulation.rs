use std::fmt;

use tracing::{debug, info, warn};

use super::audio::{AudioCue, AudioSink, NullAudio};
use super::dungeon::Dungeon;
use super::geometry::Vec2;
use super::input::{InputAction, InputSnapshot};
use super::item::{Item, ItemKind};
use super::persistence::{MemorySaveStore, SaveError, SaveRecord, SaveStore, SAVE_VERSION};
use super::player::{Player, PlayerPresentation};
use super::render::DrawSink;
use super::room::{Direction, EnemyHit, ItemPickup, RoomId};
use super::tilemap::Collider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::GameOver | SessionState::Victory)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::GameOver => "game_over",
            SessionState::Victory => "victory",
        };
        f.write_str(label)
    }
}

/// Collaborators handed to the simulation. Nothing here is global.
pub struct SimulationServices {
    pub audio: Box<dyn AudioSink>,
    pub saves: Box<dyn SaveStore>,
}

impl SimulationServices {
    pub fn new(audio: Box<dyn AudioSink>, saves: Box<dyn SaveStore>) -> Self {
        Self { audio, saves }
    }
}

impl Default for SimulationServices {
    fn default() -> Self {
        Self::new(Box::new(NullAudio), Box::new(MemorySaveStore::new()))
    }
}

impl fmt::Debug for SimulationServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationServices").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// False when the tick was swallowed by pause, a terminal state or a quit request.
    pub advanced: bool,
    pub pickups: Vec<ItemPickup>,
    pub hits: Vec<EnemyHit>,
    pub entered_room: Option<RoomId>,
    pub quit_requested: bool,
}

/// Owns the world and the player and runs the fixed per-tick order:
/// input, player movement, room update, end conditions, room transition.
#[derive(Debug)]
pub struct Simulation {
    dungeon: Dungeon,
    player: Player,
    presentation: PlayerPresentation,
    services: SimulationServices,
    state: SessionState,
    layout_fingerprint: Option<String>,
    tick_count: u64,
}

impl Simulation {
    pub fn new(dungeon: Dungeon, player: Player, services: SimulationServices) -> Self {
        info!(
            room_id = dungeon.current_room_id(),
            room_count = dungeon.room_count(),
            "simulation_started"
        );
        Self {
            dungeon,
            player,
            presentation: PlayerPresentation::new(),
            services,
            state: SessionState::Playing,
            layout_fingerprint: None,
            tick_count: 0,
        }
    }

    /// Places the player at the start room's default spawn.
    pub fn at_start(dungeon: Dungeon, services: SimulationServices) -> Self {
        let spawn = dungeon.current_room().default_spawn();
        Self::new(dungeon, Player::new(spawn), services)
    }

    pub fn with_layout_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.layout_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn presentation(&self) -> &PlayerPresentation {
        &self.presentation
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn dungeon_mut(&mut self) -> &mut Dungeon {
        &mut self.dungeon
    }

    pub fn current_room_id(&self) -> RoomId {
        self.dungeon.current_room_id()
    }

    pub fn layout_fingerprint(&self) -> Option<&str> {
        self.layout_fingerprint.as_deref()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) -> TickReport {
        let mut report = TickReport {
            tick: self.tick_count,
            ..TickReport::default()
        };
        self.tick_count += 1;

        if input.quit_requested() {
            report.quit_requested = true;
            return report;
        }
        if self.state.is_terminal() {
            return report;
        }
        if input.just_pressed(InputAction::Pause) {
            self.toggle_pause();
        }
        if self.state == SessionState::Paused {
            return report;
        }

        if input.just_pressed(InputAction::Save) {
            if let Err(error) = self.save() {
                warn!(error = %error, "save_failed");
            }
        }
        if input.just_pressed(InputAction::Load) {
            if let Err(error) = self.load() {
                warn!(error = %error, "load_failed");
            }
        }

        report.advanced = true;
        let direction = input.movement_direction();
        let position_before = self.player.position();
        self.presentation.update(dt, direction);
        {
            let room: &dyn Collider = self.dungeon.current_room();
            self.player.update(dt, direction, Some(room));
        }

        let audio = &mut self.services.audio;
        let mut announce = |item: &Item| {
            audio.notify(AudioCue::ItemCollected {
                item_id: item.id(),
                kind: item.kind(),
            });
        };
        let outcome =
            self.dungeon
                .current_room_mut()
                .update(dt, &mut self.player, Some(&mut announce));
        for hit in outcome.hits.iter().filter(|hit| hit.applied) {
            self.services
                .audio
                .notify(AudioCue::PlayerDamaged { amount: hit.damage });
        }
        report.pickups = outcome.pickups;
        report.hits = outcome.hits;

        if report
            .pickups
            .iter()
            .any(|pickup| pickup.kind == ItemKind::Chest)
        {
            self.finish(SessionState::Victory);
            return report;
        }
        if !self.player.is_alive() {
            self.finish(SessionState::GameOver);
            return report;
        }

        report.entered_room = self.check_exit(position_before);
        report
    }

    /// Moves through the current room's edge in `direction`, if it has one.
    pub fn transition(&mut self, direction: Direction) -> bool {
        if !self.dungeon.transition(direction, &mut self.player) {
            return false;
        }
        self.services.audio.notify(AudioCue::RoomEntered {
            room_id: self.dungeon.current_room_id(),
        });
        true
    }

    pub fn save_record(&self) -> SaveRecord {
        SaveRecord {
            save_version: SAVE_VERSION,
            room_id: self.dungeon.current_room_id(),
            player_position: self.player.position().into(),
            score: self.player.score(),
            layout_fingerprint: self.layout_fingerprint.clone(),
        }
    }

    /// Validates the whole record first; on any error nothing is changed.
    pub fn apply_save_record(&mut self, record: &SaveRecord) -> Result<(), SaveError> {
        record.validate_shape()?;
        if !self.dungeon.contains_room(record.room_id) {
            return Err(SaveError::expected_actual(
                "room_id",
                "id of an existing room",
                record.room_id,
            ));
        }
        if let (Some(expected), Some(actual)) = (
            self.layout_fingerprint.as_deref(),
            record.layout_fingerprint.as_deref(),
        ) {
            if expected != actual {
                return Err(SaveError::expected_actual(
                    "layout_fingerprint",
                    expected,
                    actual,
                ));
            }
        }

        self.dungeon
            .set_current_room(record.room_id)
            .map_err(|error| SaveError::validation("room_id", error.to_string()))?;
        self.player
            .restore_progress(Vec2::from(record.player_position), record.score);
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), SaveError> {
        let record = self.save_record();
        self.services.saves.save(&record)?;
        info!(
            room_id = record.room_id,
            score = record.score,
            "game_saved"
        );
        Ok(())
    }

    pub fn load(&mut self) -> Result<(), SaveError> {
        let record = self.services.saves.load()?;
        self.apply_save_record(&record)?;
        info!(
            room_id = record.room_id,
            score = record.score,
            "game_loaded"
        );
        Ok(())
    }

    /// Current room in draw order, then the player unless the damage blink hides it.
    pub fn draw(&self, sink: &mut dyn DrawSink) {
        self.dungeon.current_room().draw(sink);
        if PlayerPresentation::is_visible(&self.player) {
            sink.draw_player(&self.player, &self.presentation);
        }
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            other => other,
        };
        info!(state = %self.state, "pause_toggled");
    }

    fn finish(&mut self, state: SessionState) {
        self.state = state;
        let cue = match state {
            SessionState::Victory => AudioCue::Victory,
            _ => AudioCue::GameOver,
        };
        self.services.audio.notify(cue);
        info!(
            state = %state,
            score = self.player.score(),
            health = self.player.health(),
            room_id = self.dungeon.current_room_id(),
            ticks = self.tick_count,
            "session_finished"
        );
    }

    fn check_exit(&mut self, position_before: Vec2) -> Option<RoomId> {
        let side = self
            .dungeon
            .current_room()
            .exit_crossed(self.player.bounds())?;
        if self.transition(side) {
            return Some(self.dungeon.current_room_id());
        }
        warn!(
            room_id = self.dungeon.current_room_id(),
            direction = %side,
            "exit_without_edge"
        );
        self.player.set_position(position_before);
        debug!(
            x = position_before.x,
            y = position_before.y,
            "player_held_at_edge"
        );
        None
    }
}
