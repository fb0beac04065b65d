use super::enemy::{Enemy, EnemyId};
use super::geometry::Rect;
use super::item::{DecorObject, Item, ItemId, ItemKind};
use super::player::{Player, PlayerPresentation};
use super::room::RoomId;
use super::tilemap::Tilemap;

/// Receives read-only draw calls. Implementations decide how, or whether, to put pixels anywhere.
pub trait DrawSink {
    fn draw_tilemap(&mut self, room_id: RoomId, tilemap: &Tilemap);
    fn draw_decor(&mut self, decor: &DecorObject);
    fn draw_item(&mut self, item: &Item);
    fn draw_enemy(&mut self, enemy: &Enemy);
    fn draw_player(&mut self, player: &Player, presentation: &PlayerPresentation);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Tilemap {
        room_id: RoomId,
        bounds: Rect,
    },
    Decor {
        bounds: Rect,
        sprite_key: String,
    },
    Item {
        id: ItemId,
        kind: ItemKind,
        bounds: Rect,
    },
    Enemy {
        id: EnemyId,
        type_name: String,
        bounds: Rect,
    },
    Player {
        bounds: Rect,
        animation: &'static str,
        frame: usize,
        flip_horizontal: bool,
    },
}

#[derive(Debug, Default)]
pub struct DrawRecorder {
    commands: Vec<DrawCommand>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawSink for DrawRecorder {
    fn draw_tilemap(&mut self, room_id: RoomId, tilemap: &Tilemap) {
        self.commands.push(DrawCommand::Tilemap {
            room_id,
            bounds: tilemap.pixel_bounds(),
        });
    }

    fn draw_decor(&mut self, decor: &DecorObject) {
        self.commands.push(DrawCommand::Decor {
            bounds: decor.bounds(),
            sprite_key: decor.sprite_key().to_string(),
        });
    }

    fn draw_item(&mut self, item: &Item) {
        self.commands.push(DrawCommand::Item {
            id: item.id(),
            kind: item.kind(),
            bounds: item.bounds(),
        });
    }

    fn draw_enemy(&mut self, enemy: &Enemy) {
        self.commands.push(DrawCommand::Enemy {
            id: enemy.id(),
            type_name: enemy.type_name().to_string(),
            bounds: enemy.bounds(),
        });
    }

    fn draw_player(&mut self, player: &Player, presentation: &PlayerPresentation) {
        self.commands.push(DrawCommand::Player {
            bounds: player.bounds(),
            animation: presentation.animation_name(),
            frame: presentation.frame(),
            flip_horizontal: presentation.flip_horizontal(),
        });
    }
}
