//! Character persistence for save/load functionality.
//!
//! A save document wraps the character with a format version, a timestamp,
//! the opaque quest list, and optionally the monsters the table defined.

use crate::catalog::Monster;
use crate::character::Character;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save format")]
    InvalidFormat,

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// A saved character with everything needed to resume play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    pub character: Character,

    /// Quest log, kept as-is.
    #[serde(default = "empty_quests")]
    pub quests: Value,

    /// Custom monsters, merged into the catalog on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monsters: Option<Vec<Monster>>,
}

fn empty_quests() -> Value {
    Value::Array(Vec::new())
}

impl SaveDocument {
    /// Create a new save document for a character.
    pub fn new(character: Character) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: Utc::now(),
            character,
            quests: empty_quests(),
            monsters: None,
        }
    }

    pub fn with_monsters(mut self, monsters: Vec<Monster>) -> Self {
        self.monsters = Some(monsters);
        self
    }

    pub fn with_quests(mut self, quests: Value) -> Self {
        self.quests = quests;
        self
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a save document.
    ///
    /// Anything without a `character` object is rejected as
    /// `InvalidFormat`. Saves from a newer format version are refused.
    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        let value: Value = serde_json::from_str(text)?;

        let Some(object) = value.as_object() else {
            return Err(PersistError::InvalidFormat);
        };
        if !object.get("character").is_some_and(Value::is_object) {
            return Err(PersistError::InvalidFormat);
        }

        let has_version = object.contains_key("version");
        let found = match object.get("version") {
            None => SAVE_VERSION,
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or(PersistError::InvalidFormat)?,
        };
        if found > SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found,
            });
        }

        let mut document: SaveDocument = if has_version {
            serde_json::from_value(value)?
        } else {
            let mut object = object.clone();
            object.insert("version".to_string(), Value::from(SAVE_VERSION));
            serde_json::from_value(Value::Object(object))?
        };
        document.version = SAVE_VERSION;
        Ok(document)
    }

    /// Save to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "Saved character");
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn metadata(&self) -> CharacterMetadata {
        CharacterMetadata {
            name: self.character.name.clone(),
            class: self.character.class_name.clone(),
            level: self.character.level,
            saved_at: self.timestamp,
        }
    }
}

/// Summary of a saved character for quick display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterMetadata {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub saved_at: DateTime<Utc>,
}

/// Information about a character save file.
#[derive(Debug, Clone)]
pub struct CharacterSaveInfo {
    /// Path to the save file.
    pub path: PathBuf,

    /// Character metadata.
    pub metadata: CharacterMetadata,
}

/// List all character save files in a directory, sorted by name.
///
/// Files that fail to parse are skipped. A missing directory is empty.
pub fn list_character_saves(dir: impl AsRef<Path>) -> Result<Vec<CharacterSaveInfo>, PersistError> {
    let dir = dir.as_ref();
    let mut saves = Vec::new();
    if !dir.exists() {
        return Ok(saves);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            match SaveDocument::load_json(&path) {
                Ok(document) => saves.push(CharacterSaveInfo {
                    metadata: document.metadata(),
                    path,
                }),
                Err(err) => debug!(path = %path.display(), %err, "Skipping unreadable save"),
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(saves)
}

/// Generate a save path for a character.
pub fn character_save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Rank;
    use crate::character::create_sample_character;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let mut character = create_sample_character("Zorian");
        character.credits = 42;
        character.installed_abilities.insert("fireball".to_string());
        character.abilities.insert("fireball".to_string(), 1);

        let document = SaveDocument::new(character.clone())
            .with_quests(serde_json::json!([{"title": "Find the key", "done": false}]))
            .with_monsters(vec![Monster::new("slime", "Slime", 2, Rank::Trash, 5, 1)]);

        let json = document.to_json().unwrap();
        let loaded = SaveDocument::from_json(&json).unwrap();

        assert_eq!(loaded, document);
        assert_eq!(loaded.character, character);
    }

    #[test]
    fn test_json_shape() {
        let json = SaveDocument::new(create_sample_character("Zorian"))
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], SAVE_VERSION);
        assert_eq!(value["character"]["class"], "Fighter");
        assert_eq!(value["character"]["attributes"]["STR"], 3);
        assert_eq!(value["quests"], serde_json::json!([]));
        assert!(value.get("monsters").is_none());
        assert!(DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_missing_character_is_invalid() {
        assert!(matches!(
            SaveDocument::from_json(r#"{"version": 1}"#),
            Err(PersistError::InvalidFormat)
        ));
        assert!(matches!(
            SaveDocument::from_json(r#"{"version": 1, "character": "Zorian"}"#),
            Err(PersistError::InvalidFormat)
        ));
        assert!(matches!(
            SaveDocument::from_json("[1, 2, 3]"),
            Err(PersistError::InvalidFormat)
        ));
        assert!(matches!(
            SaveDocument::from_json("{not json"),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn test_newer_version_refused() {
        let mut value: Value = serde_json::from_str(
            &SaveDocument::new(create_sample_character("Zorian"))
                .to_json()
                .unwrap(),
        )
        .unwrap();
        value["version"] = Value::from(SAVE_VERSION + 1);

        let err = SaveDocument::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch { expected: SAVE_VERSION, found } if found == SAVE_VERSION + 1
        ));
    }

    #[test]
    fn test_minimal_document_gets_defaults() {
        let character = serde_json::to_value(create_sample_character("Zorian")).unwrap();
        let mut character_json = character.clone();
        character_json
            .as_object_mut()
            .unwrap()
            .remove("installed_abilities");
        let text = serde_json::json!({ "character": character_json }).to_string();

        let loaded = SaveDocument::from_json(&text).unwrap();
        assert_eq!(loaded.version, SAVE_VERSION);
        assert_eq!(loaded.quests, serde_json::json!([]));
        assert!(loaded.monsters.is_none());
        assert!(loaded.character.installed_abilities.is_empty());
    }

    #[test]
    fn test_character_save_path() {
        let path = character_save_path("/saves/characters", "Sir Reginald");
        assert!(path.to_string_lossy().contains("Sir_Reginald"));
        assert!(path.to_string_lossy().ends_with(".json"));
    }

    #[test]
    fn test_character_save_path_special_chars() {
        let path = character_save_path("saves/characters", "Bob's Character!@#");
        assert!(path.to_string_lossy().contains("Bob_s_Character"));
        assert!(!path.to_string_lossy().contains('!'));
        assert!(!path.to_string_lossy().contains('@'));
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("nested").join("zorian.json");

        let document = SaveDocument::new(create_sample_character("Zorian"));
        document.save_json(&save_path).expect("Save should succeed");
        assert!(save_path.exists());

        let loaded = SaveDocument::load_json(&save_path).expect("Load should succeed");
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_list_character_saves() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for name in ["Charlie", "Alpha", "Beta"] {
            SaveDocument::new(create_sample_character(name))
                .save_json(character_save_path(temp_dir.path(), name))
                .expect("Save should succeed");
        }
        std::fs::write(temp_dir.path().join("junk.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();

        let saves = list_character_saves(temp_dir.path()).expect("List should succeed");
        let names: Vec<_> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Charlie"]);
        assert_eq!(saves[0].metadata.class, "Fighter");

        let missing = list_character_saves(temp_dir.path().join("missing")).unwrap();
        assert!(missing.is_empty());
    }
}
