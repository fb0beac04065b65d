use super::item::{ItemId, ItemKind};
use super::room::RoomId;

/// Domain events worth a sound. Delivery is fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    ItemCollected { item_id: ItemId, kind: ItemKind },
    PlayerDamaged { amount: i32 },
    RoomEntered { room_id: RoomId },
    GameOver,
    Victory,
}

impl AudioCue {
    pub fn sound_key(&self) -> &'static str {
        match self {
            AudioCue::ItemCollected {
                kind: ItemKind::Coin,
                ..
            } => "sfx/coin",
            AudioCue::ItemCollected {
                kind: ItemKind::Chest,
                ..
            } => "sfx/chest",
            AudioCue::PlayerDamaged { .. } => "sfx/hurt",
            AudioCue::RoomEntered { .. } => "sfx/door",
            AudioCue::GameOver => "music/game_over",
            AudioCue::Victory => "music/victory",
        }
    }
}

pub trait AudioSink {
    fn notify(&mut self, cue: AudioCue);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn notify(&mut self, _cue: AudioCue) {}
}
