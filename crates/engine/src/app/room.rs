use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use super::enemy::{Enemy, EnemyId};
use super::geometry::{Rect, Vec2};
use super::item::{DecorObject, Item, ItemId, ItemKind};
use super::player::{Player, PLAYER_BOUNDS_OFFSET_X, PLAYER_BOUNDS_OFFSET_Y, PLAYER_BOUNDS_SIZE};
use super::render::DrawSink;
use super::tilemap::{Collider, Tilemap};

pub type RoomId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction `{0}` (expected North, South, East or West)")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            _ => Err(UnknownDirection(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPickup {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyHit {
    pub enemy_id: EnemyId,
    pub damage: i32,
    /// False when the player was still invincible.
    pub applied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomTickOutcome {
    pub pickups: Vec<ItemPickup>,
    pub hits: Vec<EnemyHit>,
}

impl RoomTickOutcome {
    pub fn damage_taken(&self) -> i32 {
        self.hits
            .iter()
            .filter(|hit| hit.applied)
            .map(|hit| hit.damage)
            .sum()
    }
}

/// One node of the dungeon graph: a tile grid plus everything living on it.
///
/// Collections keep insertion order, which is also draw order.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    tilemap: Tilemap,
    connections: BTreeMap<Direction, RoomId>,
    items: Vec<Item>,
    enemies: Vec<Enemy>,
    decor: Vec<DecorObject>,
    entry_points: BTreeMap<Direction, Vec2>,
    default_spawn: Vec2,
}

impl Room {
    pub fn new(id: RoomId, tilemap: Tilemap) -> Self {
        let default_spawn = spawn_for_tile_center(tilemap.pixel_bounds().center());
        Self {
            id,
            tilemap,
            connections: BTreeMap::new(),
            items: Vec::new(),
            enemies: Vec::new(),
            decor: Vec::new(),
            entry_points: BTreeMap::new(),
            default_spawn,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    /// Adds an outgoing edge. An existing edge in the same direction is kept.
    pub fn connect(&mut self, direction: Direction, target: RoomId) -> bool {
        if self.connections.contains_key(&direction) {
            return false;
        }
        self.connections.insert(direction, target);
        true
    }

    pub fn connection(&self, direction: Direction) -> Option<RoomId> {
        self.connections.get(&direction).copied()
    }

    pub fn connections(&self) -> impl Iterator<Item = (Direction, RoomId)> + '_ {
        self.connections
            .iter()
            .map(|(direction, target)| (*direction, *target))
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    pub fn add_decor(&mut self, decor: DecorObject) {
        self.decor.push(decor);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn decor(&self) -> &[DecorObject] {
        &self.decor
    }

    pub fn active_item_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_active()).count()
    }

    pub fn set_default_spawn(&mut self, position: Vec2) {
        self.default_spawn = position;
    }

    pub fn default_spawn(&self) -> Vec2 {
        self.default_spawn
    }

    pub fn set_entry_point(&mut self, arrival_side: Direction, position: Vec2) {
        self.entry_points.insert(arrival_side, position);
    }

    /// Where a player arriving through `arrival_side` is placed.
    ///
    /// Authored entry points win; otherwise the player stands one tile inside the middle
    /// of that side's doorway; otherwise the default spawn.
    pub fn entry_point(&self, arrival_side: Direction) -> Vec2 {
        if let Some(position) = self.entry_points.get(&arrival_side) {
            return *position;
        }
        self.doorway_entry(arrival_side)
            .unwrap_or(self.default_spawn)
    }

    pub fn is_colliding_with_decor(&self, bounds: Rect) -> bool {
        self.decor.iter().any(|decor| bounds.intersects(&decor.bounds()))
    }

    /// Edge the player's hitbox center has left the grid through, if any.
    pub fn exit_crossed(&self, player_bounds: Rect) -> Option<Direction> {
        self.tilemap.exit_side(player_bounds)
    }

    /// Local simulation step: item pickups first, then each enemy moves and may hit the player.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut Player,
        mut on_item_collected: Option<&mut dyn FnMut(&Item)>,
    ) -> RoomTickOutcome {
        let mut outcome = RoomTickOutcome::default();

        let player_bounds = player.bounds();
        for item in &mut self.items {
            if !item.is_active() || !player_bounds.touches(&item.bounds()) {
                continue;
            }
            if !item.collect() {
                continue;
            }
            player.add_score(item.value());
            outcome.pickups.push(ItemPickup {
                item_id: item.id(),
                kind: item.kind(),
                value: item.value(),
            });
            debug!(
                room_id = self.id,
                item_id = item.id(),
                value = item.value(),
                score = player.score(),
                "item_collected"
            );
            if let Some(callback) = on_item_collected.as_mut() {
                callback(item);
            }
        }

        for enemy in &mut self.enemies {
            enemy.update(dt, player);
            if !player.bounds().touches(&enemy.bounds()) {
                continue;
            }
            let applied = player.take_damage(enemy.damage());
            if applied {
                debug!(
                    room_id = self.id,
                    enemy_id = enemy.id(),
                    damage = enemy.damage(),
                    health = player.health(),
                    "player_damaged"
                );
            }
            outcome.hits.push(EnemyHit {
                enemy_id: enemy.id(),
                damage: enemy.damage(),
                applied,
            });
        }

        outcome
    }

    /// Tilemap, decor, active items, then enemies. The player is drawn by the caller.
    pub fn draw(&self, sink: &mut dyn DrawSink) {
        sink.draw_tilemap(self.id, &self.tilemap);
        for decor in &self.decor {
            sink.draw_decor(decor);
        }
        for item in self.items.iter().filter(|item| item.is_active()) {
            sink.draw_item(item);
        }
        for enemy in &self.enemies {
            sink.draw_enemy(enemy);
        }
    }

    fn doorway_entry(&self, side: Direction) -> Option<Vec2> {
        let doorway = self
            .tilemap
            .doorways()
            .iter()
            .find(|doorway| doorway.side == side)?;
        let width = self.tilemap.width();
        let height = self.tilemap.height();
        let along = doorway.start + (doorway.end - doorway.start - 1) / 2;
        let (tile_x, tile_y) = match side {
            Direction::West => (1.min(width.saturating_sub(1)), along),
            Direction::East => (width.saturating_sub(2), along),
            Direction::North => (along, 1.min(height.saturating_sub(1))),
            Direction::South => (along, height.saturating_sub(2)),
        };
        let size = self.tilemap.tile_size() as f32;
        let origin = self.tilemap.origin();
        let center = Vec2::new(
            origin.x + (tile_x as f32 + 0.5) * size,
            origin.y + (tile_y as f32 + 0.5) * size,
        );
        Some(spawn_for_tile_center(center))
    }
}

impl Collider for Room {
    fn is_colliding(&self, bounds: Rect) -> bool {
        self.tilemap.is_colliding(bounds) || self.is_colliding_with_decor(bounds)
    }
}

/// Player position whose hitbox is centered on `center`.
fn spawn_for_tile_center(center: Vec2) -> Vec2 {
    let half = PLAYER_BOUNDS_SIZE as f32 * 0.5;
    Vec2::new(
        center.x - PLAYER_BOUNDS_OFFSET_X as f32 - half,
        center.y - PLAYER_BOUNDS_OFFSET_Y as f32 - half,
    )
}
