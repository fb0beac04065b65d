use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::atomic_io::write_text_atomic;

use super::geometry::{Vec2, MAX_WORLD_COORD};
use super::room::RoomId;

pub const SAVE_VERSION: u32 = 1;
pub const SAVE_FILE_NAME: &str = "savegame.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedVec2 {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for SavedVec2 {
    fn from(value: Vec2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<SavedVec2> for Vec2 {
    fn from(value: SavedVec2) -> Self {
        Vec2::new(value.x, value.y)
    }
}

/// The single persisted slot: where the player is and how much they have collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub save_version: u32,
    pub room_id: RoomId,
    pub player_position: SavedVec2,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_fingerprint: Option<String>,
}

impl SaveRecord {
    /// Checks that need nothing but the record itself.
    pub fn validate_shape(&self) -> Result<(), SaveError> {
        if self.save_version != SAVE_VERSION {
            return Err(SaveError::expected_actual(
                "save_version",
                SAVE_VERSION,
                self.save_version,
            ));
        }
        let expected = format!("finite coordinate within ±{MAX_WORLD_COORD} px");
        for (field, value) in [
            ("player_position.x", self.player_position.x),
            ("player_position.y", self.player_position.y),
        ] {
            if !value.is_finite() || value.abs() > MAX_WORLD_COORD {
                return Err(SaveError::expected_actual(field, &expected, value));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("read save '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write save '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encode save json: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("parse save json: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("parse save json at {json_path}: {source}")]
    ParseAt {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {field}: {message}")]
    Validation { field: String, message: String },
    #[error("no save present")]
    Empty,
}

impl SaveError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        SaveError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn expected_actual(field: &str, expected: impl Display, actual: impl Display) -> Self {
        Self::validation(field, format!("expected {expected}, got {actual}"))
    }
}

pub fn encode_save_json(record: &SaveRecord) -> Result<String, SaveError> {
    serde_json::to_string_pretty(record).map_err(SaveError::Encode)
}

/// Decodes a save, naming the offending JSON path on failure.
pub fn parse_save_json(raw: &str) -> Result<SaveRecord, SaveError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, SaveRecord>(&mut deserializer) {
        Ok(record) => Ok(record),
        Err(error) => {
            let json_path = error.path().to_string();
            let source = error.into_inner();
            if json_path.is_empty() || json_path == "." {
                Err(SaveError::Parse(source))
            } else {
                Err(SaveError::ParseAt { json_path, source })
            }
        }
    }
}

/// Storage backend for the save slot. The simulation never touches the filesystem itself.
pub trait SaveStore {
    fn save(&mut self, record: &SaveRecord) -> Result<(), SaveError>;
    fn load(&mut self) -> Result<SaveRecord, SaveError>;
}

#[derive(Debug, Clone)]
pub struct JsonSaveStore {
    path: PathBuf,
}

impl JsonSaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(saves_dir: &Path) -> Self {
        Self::new(saves_dir.join(SAVE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for JsonSaveStore {
    fn save(&mut self, record: &SaveRecord) -> Result<(), SaveError> {
        let json = encode_save_json(record)?;
        write_text_atomic(&self.path, &json).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn load(&mut self) -> Result<SaveRecord, SaveError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| SaveError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_save_json(&raw)
    }
}

/// Keeps the encoded save in memory. Goes through the same JSON path as the file store.
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    slot: Option<String>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.slot = Some(raw.into());
    }
}

impl SaveStore for MemorySaveStore {
    fn save(&mut self, record: &SaveRecord) -> Result<(), SaveError> {
        self.slot = Some(encode_save_json(record)?);
        Ok(())
    }

    fn load(&mut self) -> Result<SaveRecord, SaveError> {
        let raw = self.slot.as_deref().ok_or(SaveError::Empty)?;
        parse_save_json(raw)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn record() -> SaveRecord {
        SaveRecord {
            save_version: SAVE_VERSION,
            room_id: 3,
            player_position: SavedVec2 { x: 40.0, y: 72.5 },
            score: 30,
            layout_fingerprint: Some("abc123".to_string()),
        }
    }

    #[test]
    fn json_store_writes_and_reads_back() {
        let temp = TempDir::new().expect("tempdir");
        let mut store = JsonSaveStore::in_dir(&temp.path().join("saves"));

        store.save(&record()).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded, record());
        assert!(store.path().ends_with(SAVE_FILE_NAME));
    }

    #[test]
    fn json_store_reports_missing_file() {
        let temp = TempDir::new().expect("tempdir");
        let mut store = JsonSaveStore::in_dir(temp.path());

        let err = store.load().expect_err("missing");
        assert!(matches!(err, SaveError::Read { .. }));
    }

    #[test]
    fn parse_error_names_json_path() {
        let raw = r#"{"save_version":1,"room_id":1,"player_position":{"x":"left","y":0},"score":0}"#;
        let err = parse_save_json(raw).expect_err("bad x");
        let message = err.to_string();
        assert!(message.contains("player_position.x"), "{message}");
    }

    #[test]
    fn missing_field_is_reported() {
        let raw = r#"{"room_id":1,"player_position":{"x":0,"y":0},"score":0}"#;
        let err = parse_save_json(raw).expect_err("no version");
        assert!(err.to_string().contains("save_version"));
    }

    #[test]
    fn fingerprint_is_optional_on_disk() {
        let raw = r#"{"save_version":1,"room_id":2,"player_position":{"x":1,"y":2},"score":5}"#;
        let parsed = parse_save_json(raw).expect("parse");
        assert_eq!(parsed.layout_fingerprint, None);

        let mut without = record();
        without.layout_fingerprint = None;
        let encoded = encode_save_json(&without).expect("encode");
        assert!(!encoded.contains("layout_fingerprint"));
    }

    #[test]
    fn validate_shape_rejects_version_mismatch() {
        let mut bad = record();
        bad.save_version = SAVE_VERSION + 1;
        let err = bad.validate_shape().expect_err("version");
        assert_eq!(
            err.to_string(),
            format!(
                "validation failed at save_version: expected {SAVE_VERSION}, got {}",
                SAVE_VERSION + 1
            )
        );
    }

    #[test]
    fn validate_shape_rejects_non_finite_position() {
        let mut bad = record();
        bad.player_position.y = f32::NAN;
        let err = bad.validate_shape().expect_err("nan");
        assert!(err.to_string().contains("player_position.y"));
    }

    #[test]
    fn validate_shape_rejects_positions_outside_the_world() {
        let mut bad = record();
        bad.player_position.x = 3.0e9;
        let err = bad.validate_shape().expect_err("far x");
        assert!(err.to_string().contains("player_position.x"));

        let mut edge = record();
        edge.player_position.y = -MAX_WORLD_COORD;
        edge.validate_shape().expect("edge of world");
    }

    #[test]
    fn memory_store_starts_empty() {
        let mut store = MemorySaveStore::new();
        assert!(matches!(store.load(), Err(SaveError::Empty)));
        store.save(&record()).expect("save");
        assert_eq!(store.load().expect("load"), record());
    }
}
