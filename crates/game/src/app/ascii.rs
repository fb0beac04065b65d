use dungeon_engine::{
    DecorObject, DrawSink, Enemy, Item, ItemKind, Player, PlayerPresentation, Rect, RoomId,
    Simulation, Tilemap, Vec2,
};

const WALL_GLYPH: char = '#';
const FLOOR_GLYPH: char = '.';
const DECOR_GLYPH: char = '%';
const PLAYER_GLYPH: char = '@';

/// Text view of one room, one character per tile. Entities land on the tile under their
/// bounds center; later draws overwrite earlier ones.
#[derive(Debug, Default)]
pub(crate) struct AsciiView {
    room_id: Option<RoomId>,
    width: usize,
    height: usize,
    tile_size: f32,
    origin: Vec2,
    cells: Vec<char>,
}

impl AsciiView {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn render(&self) -> String {
        let mut out = match self.room_id {
            Some(room_id) => format!("room {room_id}\n"),
            None => String::from("room ?\n"),
        };
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    fn plot(&mut self, bounds: Rect, glyph: char) {
        if self.tile_size <= 0.0 {
            return;
        }
        let center = bounds.center();
        let column = ((center.x - self.origin.x) / self.tile_size).floor();
        let row = ((center.y - self.origin.y) / self.tile_size).floor();
        if column < 0.0 || row < 0.0 {
            return;
        }
        let (column, row) = (column as usize, row as usize);
        if column < self.width && row < self.height {
            self.cells[row * self.width + column] = glyph;
        }
    }
}

impl DrawSink for AsciiView {
    fn draw_tilemap(&mut self, room_id: RoomId, tilemap: &Tilemap) {
        self.room_id = Some(room_id);
        self.width = tilemap.width() as usize;
        self.height = tilemap.height() as usize;
        self.tile_size = tilemap.tile_size() as f32;
        self.origin = tilemap.origin();
        self.cells.clear();
        for y in 0..tilemap.height() {
            for x in 0..tilemap.width() {
                let solid = tilemap
                    .tile_at(x, y)
                    .is_some_and(|tile_id| tilemap.is_solid_tile(tile_id));
                self.cells.push(if solid { WALL_GLYPH } else { FLOOR_GLYPH });
            }
        }
    }

    fn draw_decor(&mut self, decor: &DecorObject) {
        self.plot(decor.bounds(), DECOR_GLYPH);
    }

    fn draw_item(&mut self, item: &Item) {
        let glyph = match item.kind() {
            ItemKind::Coin => '$',
            ItemKind::Chest => '=',
        };
        self.plot(item.bounds(), glyph);
    }

    fn draw_enemy(&mut self, enemy: &Enemy) {
        let glyph = match enemy.type_name() {
            "Slime" => 's',
            "Ghost" => 'g',
            "Skeleton" => 'k',
            _ => 'e',
        };
        self.plot(enemy.bounds(), glyph);
    }

    fn draw_player(&mut self, player: &Player, _presentation: &PlayerPresentation) {
        self.plot(player.bounds(), PLAYER_GLYPH);
    }
}

pub(crate) fn render_frame(simulation: &Simulation) -> String {
    let mut view = AsciiView::new();
    simulation.draw(&mut view);
    view.render()
}

#[cfg(test)]
mod tests {
    use dungeon_engine::{DungeonBuilder, Room, SimulationServices};

    use super::*;

    fn walled_room() -> Room {
        let tiles = vec![
            1, 1, 1, 1, 1, //
            1, 0, 0, 0, 1, //
            1, 0, 0, 0, 1, //
            1, 1, 1, 1, 1,
        ];
        Room::new(4, Tilemap::new(5, 4, 16, Vec2::ZERO, tiles).expect("tilemap"))
    }

    #[test]
    fn renders_walls_items_and_player() {
        let mut room = walled_room();
        room.add_item(Item::coin(Vec2::new(48.0, 32.0)));
        let mut builder = DungeonBuilder::new();
        builder.add_room(room).expect("room");
        let dungeon = builder.build().expect("dungeon");
        // Hitbox (16,16)-(32,32) centers on tile (1, 1).
        let player = Player::new(Vec2::new(8.0, 0.0));
        let simulation = Simulation::new(dungeon, player, SimulationServices::default());

        let frame = render_frame(&simulation);

        assert_eq!(frame, "room 4\n#####\n#@..#\n#..$#\n#####\n");
    }

    #[test]
    fn plots_outside_the_grid_are_dropped() {
        let mut view = AsciiView::new();
        let tilemap = Tilemap::open(2, 1, 16, Vec2::ZERO).expect("tilemap");
        view.draw_tilemap(9, &tilemap);
        view.plot(Rect::new(-40, 0, 16, 16), PLAYER_GLYPH);
        view.plot(Rect::new(64, 0, 16, 16), PLAYER_GLYPH);

        assert_eq!(view.render(), "room 9\n..\n");
    }
}
