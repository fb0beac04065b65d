use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use super::player::Player;
use super::room::{Direction, Room, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DungeonError {
    #[error("room {room_id} is defined more than once")]
    DuplicateRoom { room_id: RoomId },
    #[error("room {room_id} connects {direction} to missing room {target}")]
    DanglingEdge {
        room_id: RoomId,
        direction: Direction,
        target: RoomId,
    },
    #[error("room {room_id} does not exist")]
    UnknownRoom { room_id: RoomId },
    #[error("dungeon has no rooms")]
    EmptyDungeon,
    #[error("start room {room_id} does not exist")]
    StartRoomMissing { room_id: RoomId },
}

/// Collects rooms and edges, then validates the whole graph at once.
#[derive(Debug, Default)]
pub struct DungeonBuilder {
    rooms: Vec<Room>,
    start: Option<RoomId>,
}

impl DungeonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&mut self, room: Room) -> Result<&mut Self, DungeonError> {
        if self.rooms.iter().any(|existing| existing.id() == room.id()) {
            return Err(DungeonError::DuplicateRoom { room_id: room.id() });
        }
        self.rooms.push(room);
        Ok(self)
    }

    /// Adds an edge out of `from`. The target is only checked by `build`.
    pub fn connect(
        &mut self,
        from: RoomId,
        direction: Direction,
        target: RoomId,
    ) -> Result<bool, DungeonError> {
        let room = self
            .rooms
            .iter_mut()
            .find(|room| room.id() == from)
            .ok_or(DungeonError::UnknownRoom { room_id: from })?;
        Ok(room.connect(direction, target))
    }

    pub fn start_at(&mut self, room_id: RoomId) -> &mut Self {
        self.start = Some(room_id);
        self
    }

    /// Without an explicit start the first added room is used.
    pub fn build(self) -> Result<Dungeon, DungeonError> {
        let first_id = self
            .rooms
            .first()
            .map(Room::id)
            .ok_or(DungeonError::EmptyDungeon)?;

        let index_by_id: BTreeMap<RoomId, usize> = self
            .rooms
            .iter()
            .enumerate()
            .map(|(index, room)| (room.id(), index))
            .collect();

        for room in &self.rooms {
            for (direction, target) in room.connections() {
                if !index_by_id.contains_key(&target) {
                    return Err(DungeonError::DanglingEdge {
                        room_id: room.id(),
                        direction,
                        target,
                    });
                }
            }
        }

        let start_id = self.start.unwrap_or(first_id);
        let current = *index_by_id
            .get(&start_id)
            .ok_or(DungeonError::StartRoomMissing { room_id: start_id })?;

        info!(
            room_count = self.rooms.len(),
            start_room = start_id,
            "dungeon_built"
        );
        Ok(Dungeon {
            rooms: self.rooms,
            index_by_id,
            current,
        })
    }
}

/// Arena of rooms keyed by id, plus the single active room.
#[derive(Debug)]
pub struct Dungeon {
    rooms: Vec<Room>,
    index_by_id: BTreeMap<RoomId, usize>,
    current: usize,
}

impl Dungeon {
    pub fn current_room_id(&self) -> RoomId {
        self.rooms[self.current].id()
    }

    pub fn current_room(&self) -> &Room {
        &self.rooms[self.current]
    }

    pub fn current_room_mut(&mut self) -> &mut Room {
        &mut self.rooms[self.current]
    }

    pub fn room(&self, room_id: RoomId) -> Option<&Room> {
        self.index_by_id
            .get(&room_id)
            .map(|index| &self.rooms[*index])
    }

    pub fn room_mut(&mut self, room_id: RoomId) -> Option<&mut Room> {
        let index = *self.index_by_id.get(&room_id)?;
        Some(&mut self.rooms[index])
    }

    pub fn contains_room(&self, room_id: RoomId) -> bool {
        self.index_by_id.contains_key(&room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Adds an edge between two existing rooms. First edge per direction wins.
    pub fn connect(
        &mut self,
        from: RoomId,
        direction: Direction,
        target: RoomId,
    ) -> Result<bool, DungeonError> {
        if !self.contains_room(target) {
            return Err(DungeonError::DanglingEdge {
                room_id: from,
                direction,
                target,
            });
        }
        let room = self
            .room_mut(from)
            .ok_or(DungeonError::UnknownRoom { room_id: from })?;
        Ok(room.connect(direction, target))
    }

    pub fn neighbor(&self, direction: Direction) -> Option<RoomId> {
        self.current_room().connection(direction)
    }

    /// Follows the current room's edge in `direction` and places the player at the
    /// new room's entry point. Without an edge nothing changes and `false` is returned.
    pub fn transition(&mut self, direction: Direction, player: &mut Player) -> bool {
        let Some(target) = self.neighbor(direction) else {
            debug!(
                room_id = self.current_room_id(),
                direction = %direction,
                "transition_rejected"
            );
            return false;
        };
        let Some(index) = self.index_by_id.get(&target).copied() else {
            return false;
        };

        let from = self.current_room_id();
        self.current = index;
        let entry = self.rooms[index].entry_point(direction.opposite());
        player.set_position(entry);
        info!(
            from_room = from,
            room_id = target,
            direction = %direction,
            entry_x = entry.x,
            entry_y = entry.y,
            "room_entered"
        );
        true
    }

    /// Makes `room_id` current without touching the player.
    pub fn set_current_room(&mut self, room_id: RoomId) -> Result<(), DungeonError> {
        let index = *self
            .index_by_id
            .get(&room_id)
            .ok_or(DungeonError::UnknownRoom { room_id })?;
        self.current = index;
        Ok(())
    }
}
