//! Session - the primary public API for tracking a character.
//!
//! A `Session` owns the character, the queue of pending rewards, and the
//! quest and monster data carried by its save file. It borrows the registry
//! and rules, which are built once and shared.

use crate::catalog::{Catalog, Monster};
use crate::character::Character;
use crate::persist::{PersistError, SaveDocument};
use crate::progression::LevelUpReport;
use crate::registry::Registry;
use crate::rewards::{apply_reward, calculate_reward, RewardRequest, RewardResult};
use crate::rules::ProgressionRules;
use crate::sheet::{CharacterSheet, SheetError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors from Session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No pending reward with id {0}")]
    UnknownReward(RewardId),

    #[error("Saved level {level} is outside 1..={max_level}")]
    LevelOutOfRange { level: u32, max_level: u32 },

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),
}

/// Identifier of a queued reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardId(Uuid);

impl RewardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RewardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RewardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RewardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A computed reward waiting to be applied or discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReward {
    pub id: RewardId,
    pub request: RewardRequest,
    /// Totals computed when the reward was queued.
    pub result: RewardResult,
    pub queued_at: DateTime<Utc>,
}

/// A character tracking session.
pub struct Session<'a> {
    character: Character,
    pending: Vec<PendingReward>,
    quests: Value,
    custom_monsters: Vec<Monster>,
    registry: &'a Registry,
    base_catalog: &'a Catalog,
    /// `base_catalog` plus `custom_monsters`.
    catalog: Cow<'a, Catalog>,
    rules: &'a ProgressionRules,
}

impl<'a> Session<'a> {
    /// Create a session for a character.
    pub fn new(
        character: Character,
        registry: &'a Registry,
        catalog: &'a Catalog,
        rules: &'a ProgressionRules,
    ) -> Self {
        Self {
            character,
            pending: Vec::new(),
            quests: Value::Array(Vec::new()),
            custom_monsters: Vec::new(),
            registry,
            base_catalog: catalog,
            catalog: Cow::Borrowed(catalog),
            rules,
        }
    }

    /// Create a session from a save document, merging its monsters into the
    /// catalog.
    pub fn from_document(
        document: SaveDocument,
        registry: &'a Registry,
        catalog: &'a Catalog,
        rules: &'a ProgressionRules,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(document.character.clone(), registry, catalog, rules);
        session.replace_from(document)?;
        Ok(session)
    }

    /// Load a saved session from a file.
    pub fn load(
        path: impl AsRef<Path>,
        registry: &'a Registry,
        catalog: &'a Catalog,
        rules: &'a ProgressionRules,
    ) -> Result<Self, SessionError> {
        let document = SaveDocument::load_json(path)?;
        Self::from_document(document, registry, catalog, rules)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &'a ProgressionRules {
        self.rules
    }

    pub fn quests(&self) -> &Value {
        &self.quests
    }

    /// Edit attributes, abilities and class.
    pub fn sheet(&mut self) -> CharacterSheet<'_> {
        CharacterSheet::new(&mut self.character, self.registry, self.rules)
    }

    /// Change class. Shorthand for `sheet().change_class(..)`.
    pub fn change_class(&mut self, class_name: &str) -> Result<(), SessionError> {
        Ok(self.sheet().change_class(class_name)?)
    }

    // ========================================================================
    // Rewards
    // ========================================================================

    /// Compute a reward without queueing it.
    pub fn preview(&self, request: &RewardRequest) -> RewardResult {
        calculate_reward(request, &self.character, self.registry, &self.catalog)
    }

    /// Compute a reward and queue it for later application.
    pub fn queue_reward(&mut self, request: RewardRequest) -> RewardId {
        let result = self.preview(&request);
        let id = RewardId::new();
        debug!(%id, xp = result.xp, credits = result.credits, "Queued reward");
        self.pending.push(PendingReward {
            id,
            request,
            result,
            queued_at: Utc::now(),
        });
        id
    }

    /// Rewards waiting to be applied, oldest first.
    pub fn pending(&self) -> &[PendingReward] {
        &self.pending
    }

    /// Drop a pending reward without applying it.
    pub fn discard(&mut self, id: RewardId) -> Option<PendingReward> {
        let index = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Apply a pending reward and remove it from the queue.
    ///
    /// An unknown id changes nothing.
    pub fn apply(
        &mut self,
        id: RewardId,
        chapter: Option<&str>,
    ) -> Result<LevelUpReport, SessionError> {
        let index = self
            .pending
            .iter()
            .position(|p| p.id == id)
            .ok_or(SessionError::UnknownReward(id))?;

        let (updated, report) =
            apply_reward(&self.character, &self.pending[index].result, chapter, self.rules);
        self.character = updated;
        self.pending.remove(index);
        Ok(report)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// The save document for the current state.
    pub fn to_document(&self) -> SaveDocument {
        let document = SaveDocument::new(self.character.clone()).with_quests(self.quests.clone());
        if self.custom_monsters.is_empty() {
            document
        } else {
            document.with_monsters(self.custom_monsters.clone())
        }
    }

    pub fn export_json(&self) -> Result<String, SessionError> {
        Ok(self.to_document().to_json()?)
    }

    /// Replace the character from a save document.
    ///
    /// Nothing changes unless the whole document parses. Pending rewards
    /// were computed for the old character and are dropped.
    pub fn import_json(&mut self, text: &str) -> Result<(), SessionError> {
        let document = SaveDocument::from_json(text)?;
        self.replace_from(document)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        self.to_document().save_json(path)?;
        Ok(())
    }

    fn replace_from(&mut self, document: SaveDocument) -> Result<(), SessionError> {
        let level = document.character.level;
        if level == 0 || level > self.rules.max_level {
            return Err(SessionError::LevelOutOfRange {
                level,
                max_level: self.rules.max_level,
            });
        }

        let monsters = document.monsters.unwrap_or_default();
        self.catalog = if monsters.is_empty() {
            Cow::Borrowed(self.base_catalog)
        } else {
            Cow::Owned(self.base_catalog.clone().with_monsters(monsters.iter().cloned()))
        };
        self.custom_monsters = monsters;
        self.quests = document.quests;
        self.character = document.character;
        self.pending.clear();
        info!(character = %self.character.name, "Loaded character");
        Ok(())
    }
}
