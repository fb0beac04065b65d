use std::collections::BTreeSet;

use thiserror::Error;

use super::geometry::{Rect, Vec2};
use super::room::Direction;

pub const FLOOR_TILE_ID: u16 = 0;
pub const WALL_TILE_ID: u16 = 1;
pub const DEFAULT_TILE_SIZE_PX: u32 = 16;
pub const MAX_TILE_SIZE_PX: u32 = 1024;

/// Anything that can answer "would this rectangle be blocked here?".
pub trait Collider {
    fn is_colliding(&self, bounds: Rect) -> bool;
}

/// An opening in one edge of the grid, covering tiles `start..end` along that edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doorway {
    pub side: Direction,
    pub start: u32,
    pub end: u32,
}

/// Tilemap origin convention:
/// - `origin` is the world position of tile (0,0) top-left corner.
/// - Tile (x,y) covers `origin + (x, y) * tile_size` to `origin + (x + 1, y + 1) * tile_size`.
///
/// Cells outside the grid are solid, except the ring of cells directly beyond a doorway span.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size: u32,
    origin: Vec2,
    tiles: Vec<u16>,
    solid_tile_ids: BTreeSet<u16>,
    doorways: Vec<Doorway>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be greater than zero")]
    ZeroTileSize,
    #[error("tile size {tile_size} exceeds the {max} px limit")]
    TileSizeTooLarge { tile_size: u32, max: u32 },
    #[error("doorway on {side:?} edge spans {start}..{end}, edge length is {edge_len}")]
    DoorwayOutOfRange {
        side: Direction,
        start: u32,
        end: u32,
        edge_len: u32,
    },
}

fn pixel_extent(cells: u32, tile_size: u32) -> i32 {
    i32::try_from(u64::from(cells) * u64::from(tile_size)).unwrap_or(i32::MAX)
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: u32,
        origin: Vec2,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        if tile_size == 0 {
            return Err(TilemapError::ZeroTileSize);
        }
        if tile_size > MAX_TILE_SIZE_PX {
            return Err(TilemapError::TileSizeTooLarge {
                tile_size,
                max: MAX_TILE_SIZE_PX,
            });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            origin,
            tiles,
            solid_tile_ids: BTreeSet::from([WALL_TILE_ID]),
            doorways: Vec::new(),
        })
    }

    /// Open floor of the given size with no walls.
    pub fn open(
        width: u32,
        height: u32,
        tile_size: u32,
        origin: Vec2,
    ) -> Result<Self, TilemapError> {
        Self::new(
            width,
            height,
            tile_size,
            origin,
            vec![FLOOR_TILE_ID; width as usize * height as usize],
        )
    }

    pub fn with_solid_tile_ids(mut self, ids: impl IntoIterator<Item = u16>) -> Self {
        self.solid_tile_ids = ids.into_iter().collect();
        self
    }

    pub fn add_doorway(&mut self, doorway: Doorway) -> Result<(), TilemapError> {
        let edge_len = self.edge_len(doorway.side);
        if doorway.start >= doorway.end || doorway.end > edge_len {
            return Err(TilemapError::DoorwayOutOfRange {
                side: doorway.side,
                start: doorway.start,
                end: doorway.end,
                edge_len,
            });
        }
        self.doorways.push(doorway);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn doorways(&self) -> &[Doorway] {
        &self.doorways
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn is_solid_tile(&self, tile_id: u16) -> bool {
        self.solid_tile_ids.contains(&tile_id)
    }

    /// World-space rectangle covered by the whole grid.
    pub fn pixel_bounds(&self) -> Rect {
        Rect::new(
            self.origin.x as i32,
            self.origin.y as i32,
            pixel_extent(self.width, self.tile_size),
            pixel_extent(self.height, self.tile_size),
        )
    }

    pub fn world_to_tile(&self, world: Vec2) -> Option<(u32, u32)> {
        let (tile_x, tile_y) = self.world_to_cell(world.x, world.y);
        if tile_x < 0 || tile_y < 0 {
            return None;
        }
        let (tile_x, tile_y) = (tile_x as u32, tile_y as u32);
        self.index_of(tile_x, tile_y)?;
        Some((tile_x, tile_y))
    }

    /// Edge whose line the rectangle's center has crossed, if any.
    pub fn exit_side(&self, bounds: Rect) -> Option<Direction> {
        let center = bounds.center();
        let grid = self.pixel_bounds();
        if center.x < grid.x as f32 {
            Some(Direction::West)
        } else if center.x >= grid.right() as f32 {
            Some(Direction::East)
        } else if center.y < grid.y as f32 {
            Some(Direction::North)
        } else if center.y >= grid.bottom() as f32 {
            Some(Direction::South)
        } else {
            None
        }
    }

    fn world_to_cell(&self, world_x: f32, world_y: f32) -> (i64, i64) {
        let size = self.tile_size as f32;
        (
            ((world_x - self.origin.x) / size).floor() as i64,
            ((world_y - self.origin.y) / size).floor() as i64,
        )
    }

    fn edge_len(&self, side: Direction) -> u32 {
        match side {
            Direction::North | Direction::South => self.width,
            Direction::East | Direction::West => self.height,
        }
    }

    fn cell_blocks(&self, cell_x: i64, cell_y: i64) -> bool {
        let width = self.width as i64;
        let height = self.height as i64;
        let inside_x = (0..width).contains(&cell_x);
        let inside_y = (0..height).contains(&cell_y);
        if inside_x && inside_y {
            let tile_id = self
                .tile_at(cell_x as u32, cell_y as u32)
                .unwrap_or(FLOOR_TILE_ID);
            return self.is_solid_tile(tile_id);
        }

        let (side, along) = if inside_x && cell_y == -1 {
            (Direction::North, cell_x)
        } else if inside_x && cell_y == height {
            (Direction::South, cell_x)
        } else if inside_y && cell_x == -1 {
            (Direction::West, cell_y)
        } else if inside_y && cell_x == width {
            (Direction::East, cell_y)
        } else {
            return true;
        };

        !self.doorways.iter().any(|doorway| {
            doorway.side == side && (doorway.start as i64..doorway.end as i64).contains(&along)
        })
    }
}

impl Collider for Tilemap {
    fn is_colliding(&self, bounds: Rect) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let (left, top) = self.world_to_cell(bounds.x as f32, bounds.y as f32);
        let (right, bottom) =
            self.world_to_cell((bounds.right() - 1) as f32, (bounds.bottom() - 1) as f32);
        for cell_y in top..=bottom {
            for cell_x in left..=right {
                if self.cell_blocks(cell_x, cell_y) {
                    return true;
                }
            }
        }
        false
    }
}
