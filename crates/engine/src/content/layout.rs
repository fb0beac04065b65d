use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::info;

use crate::app::{
    BehaviorKind, DecorObject, Direction, Doorway, Dungeon, DungeonBuilder, Room, RoomId, Tilemap,
    Vec2, DEFAULT_TILE_SIZE_PX, FLOOR_TILE_ID, MAX_TILE_SIZE_PX, MAX_WORLD_COORD, WALL_TILE_ID,
};
use crate::sprite_keys::validate_sprite_key;

use super::factory::{EnemyFactory, ItemFactory};
use super::hashing::fingerprint_layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    MissingAttribute,
    InvalidValue,
    InvalidTiles,
    UnknownType,
    DuplicateRoom,
    DanglingEdge,
    InvalidGraph,
}

#[derive(Debug, Clone, Error)]
#[error("{code:?}: {message} (file={}{})", .file_path.display(), location_suffix(.location))]
pub struct LayoutError {
    pub code: LayoutErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

fn location_suffix(location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) => format!(", line={}, column={}", loc.line, loc.column),
        None => String::new(),
    }
}

/// A parsed layout plus the fingerprint of the text it came from.
#[derive(Debug)]
pub struct DungeonLayout {
    pub dungeon: Dungeon,
    pub fingerprint: String,
}

pub fn load_layout_file(path: &Path) -> Result<DungeonLayout, LayoutError> {
    let raw = fs::read_to_string(path).map_err(|source| LayoutError {
        code: LayoutErrorCode::ReadFile,
        message: format!("failed to read layout file: {source}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    parse_layout(&raw, path)
}

/// Parses a `<Dungeon>` document. `file_path` is only used for error reporting.
pub fn parse_layout(raw: &str, file_path: &Path) -> Result<DungeonLayout, LayoutError> {
    let doc = Document::parse(raw).map_err(|error| LayoutError {
        code: LayoutErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let ctx = LayoutContext { file_path, doc: &doc };

    let root = doc.root_element();
    if root.tag_name().name() != "Dungeon" {
        return Err(ctx.error_at(
            LayoutErrorCode::InvalidRoot,
            "root element must be <Dungeon>".to_string(),
            root,
        ));
    }
    let start = ctx.optional_attr::<RoomId>(root, "start")?;
    let tile_size = ctx
        .optional_attr::<u32>(root, "tileSize")?
        .unwrap_or(DEFAULT_TILE_SIZE_PX);
    if tile_size == 0 || tile_size > MAX_TILE_SIZE_PX {
        return Err(ctx.error_at(
            LayoutErrorCode::InvalidValue,
            format!("tileSize must be within 1..={MAX_TILE_SIZE_PX}, got {tile_size}"),
            root,
        ));
    }

    let mut enemies = EnemyFactory::new();
    let items = ItemFactory;
    let mut builder = DungeonBuilder::new();
    let mut room_nodes = BTreeMap::<RoomId, Node<'_, '_>>::new();
    let mut pending_edges = Vec::<PendingEdge<'_, '_>>::new();

    for room_node in root.children().filter(|node| node.is_element()) {
        if room_node.tag_name().name() != "Room" {
            return Err(ctx.error_at(
                LayoutErrorCode::UnknownElement,
                format!(
                    "unsupported element <{}> in <Dungeon>; expected <Room>",
                    room_node.tag_name().name()
                ),
                room_node,
            ));
        }
        let room = ctx.parse_room(
            room_node,
            tile_size,
            &mut enemies,
            &items,
            &mut pending_edges,
        )?;
        if room_nodes.insert(room.id(), room_node).is_some() {
            return Err(ctx.error_at(
                LayoutErrorCode::DuplicateRoom,
                format!("room id {} is defined more than once", room.id()),
                room_node,
            ));
        }
        builder.add_room(room).map_err(|error| {
            ctx.error_at(LayoutErrorCode::InvalidGraph, error.to_string(), room_node)
        })?;
    }

    for edge in &pending_edges {
        if !room_nodes.contains_key(&edge.target) {
            return Err(ctx.error_at(
                LayoutErrorCode::DanglingEdge,
                format!(
                    "room {} connects {} to missing room {}",
                    edge.from, edge.direction, edge.target
                ),
                edge.node,
            ));
        }
    }
    if let Some(start) = start {
        builder.start_at(start);
    }
    let dungeon = builder
        .build()
        .map_err(|error| ctx.error_at(LayoutErrorCode::InvalidGraph, error.to_string(), root))?;

    let fingerprint = fingerprint_layout(raw);
    info!(
        file = %file_path.display(),
        room_count = dungeon.room_count(),
        start_room = dungeon.current_room_id(),
        fingerprint = %fingerprint,
        "layout_loaded"
    );
    Ok(DungeonLayout {
        dungeon,
        fingerprint,
    })
}

struct PendingEdge<'a, 'input> {
    from: RoomId,
    direction: Direction,
    target: RoomId,
    node: Node<'a, 'input>,
}

struct LayoutContext<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl<'a, 'input> LayoutContext<'a, 'input> {
    fn parse_room(
        &self,
        node: Node<'a, 'input>,
        tile_size: u32,
        enemies: &mut EnemyFactory,
        items: &ItemFactory,
        pending_edges: &mut Vec<PendingEdge<'a, 'input>>,
    ) -> Result<Room, LayoutError> {
        let room_id = self.required_attr::<RoomId>(node, "id")?;

        let tiles_nodes: Vec<_> = node
            .children()
            .filter(|child| child.is_element() && child.tag_name().name() == "Tiles")
            .collect();
        let tiles_node = match tiles_nodes.as_slice() {
            [single] => *single,
            [] => {
                return Err(self.error_at(
                    LayoutErrorCode::MissingAttribute,
                    format!("room {room_id} is missing <Tiles>"),
                    node,
                ))
            }
            [_, second, ..] => {
                return Err(self.error_at(
                    LayoutErrorCode::InvalidTiles,
                    format!("room {room_id} has more than one <Tiles>"),
                    *second,
                ))
            }
        };
        let mut tilemap = self.parse_tiles(tiles_node, tile_size)?;

        // Doorways first so entry points can be derived from them.
        for child in node.children().filter(|child| child.is_element()) {
            if child.tag_name().name() == "Doorway" {
                let doorway = Doorway {
                    side: self.required_attr::<Direction>(child, "side")?,
                    start: self.required_attr::<u32>(child, "start")?,
                    end: self.required_attr::<u32>(child, "end")?,
                };
                tilemap.add_doorway(doorway).map_err(|error| {
                    self.error_at(LayoutErrorCode::InvalidValue, error.to_string(), child)
                })?;
            }
        }

        let mut room = Room::new(room_id, tilemap);
        for child in node.children().filter(|child| child.is_element()) {
            match child.tag_name().name() {
                "Tiles" | "Doorway" => {}
                "Spawn" => room.set_default_spawn(self.position(child)?),
                "Entry" => {
                    let side = self.required_attr::<Direction>(child, "side")?;
                    room.set_entry_point(side, self.position(child)?);
                }
                "Connect" => {
                    let direction = self.required_attr::<Direction>(child, "direction")?;
                    let target = self.required_attr::<RoomId>(child, "target")?;
                    if room.connect(direction, target) {
                        pending_edges.push(PendingEdge {
                            from: room_id,
                            direction,
                            target,
                            node: child,
                        });
                    }
                }
                "Item" => {
                    let type_name = self.required_attr::<String>(child, "type")?;
                    let mut item = items
                        .create(&type_name, self.position(child)?)
                        .map_err(|error| {
                            self.error_at(LayoutErrorCode::UnknownType, error.to_string(), child)
                        })?;
                    if let Some(value) = self.optional_attr::<u32>(child, "value")? {
                        item = item.with_value(value);
                    }
                    room.add_item(item);
                }
                "Enemy" => {
                    let type_name = self.required_attr::<String>(child, "type")?;
                    let behavior = self.optional_attr::<String>(child, "behavior")?;
                    let behavior = match behavior {
                        Some(name) => Some(name.parse::<BehaviorKind>().map_err(|_| {
                            self.error_at(
                                LayoutErrorCode::InvalidValue,
                                format!(
                                    "invalid behavior '{name}'; allowed values: patrol, chase, sentry"
                                ),
                                child,
                            )
                        })?),
                        None => None,
                    };
                    let enemy = enemies
                        .create_with_behavior(&type_name, self.position(child)?, behavior)
                        .map_err(|error| {
                            self.error_at(LayoutErrorCode::UnknownType, error.to_string(), child)
                        })?;
                    room.add_enemy(enemy);
                }
                "Decor" => {
                    let sprite = self.required_attr::<String>(child, "sprite")?;
                    validate_sprite_key(&sprite).map_err(|error| {
                        self.error_at(
                            LayoutErrorCode::InvalidValue,
                            format!("invalid sprite key '{sprite}': {error}"),
                            child,
                        )
                    })?;
                    let width = self.required_attr::<i32>(child, "width")?;
                    let height = self.required_attr::<i32>(child, "height")?;
                    if width <= 0 || height <= 0 {
                        return Err(self.error_at(
                            LayoutErrorCode::InvalidValue,
                            "decor width and height must be > 0".to_string(),
                            child,
                        ));
                    }
                    let position = self.position(child)?;
                    room.add_decor(DecorObject::new(position, width, height, sprite));
                }
                other => {
                    return Err(self.error_at(
                        LayoutErrorCode::UnknownElement,
                        format!("unknown element <{other}> in <Room>"),
                        child,
                    ))
                }
            }
        }
        Ok(room)
    }

    fn parse_tiles(&self, node: Node<'a, 'input>, tile_size: u32) -> Result<Tilemap, LayoutError> {
        let solid_ids = match node.attribute("solid") {
            Some(raw) => raw
                .split(',')
                .map(|part| part.trim().parse::<u16>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| {
                    self.error_at(
                        LayoutErrorCode::InvalidValue,
                        format!("solid '{raw}' must be a comma-separated list of tile ids"),
                        node,
                    )
                })?,
            None => vec![WALL_TILE_ID],
        };

        let mut width: Option<usize> = None;
        let mut height = 0u32;
        let mut tiles = Vec::<u16>::new();
        for row in node.children().filter(|child| child.is_element()) {
            if row.tag_name().name() != "Row" {
                return Err(self.error_at(
                    LayoutErrorCode::UnknownElement,
                    format!("unknown element <{}> in <Tiles>", row.tag_name().name()),
                    row,
                ));
            }
            let text = row.text().map(str::trim).unwrap_or_default();
            let mut row_tiles = Vec::with_capacity(text.len());
            for ch in text.chars() {
                row_tiles.push(tile_id_for_char(ch).ok_or_else(|| {
                    self.error_at(
                        LayoutErrorCode::InvalidTiles,
                        format!("invalid tile character '{ch}'; use '.', '#' or a digit"),
                        row,
                    )
                })?);
            }
            match width {
                None if row_tiles.is_empty() => {
                    return Err(self.error_at(
                        LayoutErrorCode::InvalidTiles,
                        "tile rows must not be empty".to_string(),
                        row,
                    ))
                }
                None => width = Some(row_tiles.len()),
                Some(expected) if expected != row_tiles.len() => {
                    return Err(self.error_at(
                        LayoutErrorCode::InvalidTiles,
                        format!(
                            "row has {} tiles, expected {expected} like the first row",
                            row_tiles.len()
                        ),
                        row,
                    ))
                }
                Some(_) => {}
            }
            tiles.extend(row_tiles);
            height += 1;
        }

        let Some(width) = width else {
            return Err(self.error_at(
                LayoutErrorCode::InvalidTiles,
                "<Tiles> must contain at least one <Row>".to_string(),
                node,
            ));
        };
        Tilemap::new(width as u32, height, tile_size, Vec2::ZERO, tiles)
            .map(|tilemap| tilemap.with_solid_tile_ids(solid_ids))
            .map_err(|error| self.error_at(LayoutErrorCode::InvalidTiles, error.to_string(), node))
    }

    fn position(&self, node: Node<'a, 'input>) -> Result<Vec2, LayoutError> {
        let x = self.required_attr::<f32>(node, "x")?;
        let y = self.required_attr::<f32>(node, "y")?;
        let position = Vec2::new(x, y);
        if !position.is_within_world() {
            return Err(self.error_at(
                LayoutErrorCode::InvalidValue,
                format!("position ({x}, {y}) must be finite and within ±{MAX_WORLD_COORD} px"),
                node,
            ));
        }
        Ok(position)
    }

    fn required_attr<T: FromStr>(
        &self,
        node: Node<'a, 'input>,
        name: &str,
    ) -> Result<T, LayoutError> {
        match self.optional_attr(node, name)? {
            Some(value) => Ok(value),
            None => Err(self.error_at(
                LayoutErrorCode::MissingAttribute,
                format!(
                    "missing required attribute '{name}' on <{}>",
                    node.tag_name().name()
                ),
                node,
            )),
        }
    }

    fn optional_attr<T: FromStr>(
        &self,
        node: Node<'a, 'input>,
        name: &str,
    ) -> Result<Option<T>, LayoutError> {
        let Some(raw) = node.attribute(name) else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(self.error_at(
                LayoutErrorCode::MissingAttribute,
                format!("attribute '{name}' must not be empty"),
                node,
            ));
        }
        trimmed.parse::<T>().map(Some).map_err(|_| {
            self.error_at(
                LayoutErrorCode::InvalidValue,
                format!("attribute '{name}' has invalid value '{trimmed}'"),
                node,
            )
        })
    }

    fn error_at(&self, code: LayoutErrorCode, message: String, node: Node<'_, '_>) -> LayoutError {
        let pos = self.doc.text_pos_at(node.range().start);
        LayoutError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

fn tile_id_for_char(ch: char) -> Option<u16> {
    match ch {
        '.' => Some(FLOOR_TILE_ID),
        '#' => Some(WALL_TILE_ID),
        _ => ch.to_digit(10).map(|digit| digit as u16),
    }
}
