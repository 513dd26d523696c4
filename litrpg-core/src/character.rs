//! Character sheet types.
//!
//! Contains the six attributes, the attribute container, and the
//! `Character` aggregate that every sheet action and reward mutates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Minimum value of every attribute. Points up to this floor are free.
pub const ATTRIBUTE_FLOOR: u32 = 3;

/// Number of attributes on a sheet.
pub const NUM_ATTRIBUTES: usize = 6;

// ============================================================================
// Attributes
// ============================================================================

/// The six character attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "STR")]
    Strength,
    #[serde(rename = "PER")]
    Perception,
    #[serde(rename = "DEX")]
    Dexterity,
    #[serde(rename = "MEM")]
    Memory,
    #[serde(rename = "INT")]
    Intelligence,
    #[serde(rename = "CHA")]
    Charisma,
}

impl Attribute {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Perception => "PER",
            Attribute::Dexterity => "DEX",
            Attribute::Memory => "MEM",
            Attribute::Intelligence => "INT",
            Attribute::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Perception => "Perception",
            Attribute::Dexterity => "Dexterity",
            Attribute::Memory => "Memory",
            Attribute::Intelligence => "Intelligence",
            Attribute::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Attribute; NUM_ATTRIBUTES] {
        [
            Attribute::Strength,
            Attribute::Perception,
            Attribute::Dexterity,
            Attribute::Memory,
            Attribute::Intelligence,
            Attribute::Charisma,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Error returned when parsing an unknown attribute abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown attribute: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Attribute::all()
            .into_iter()
            .find(|a| {
                a.abbreviation().eq_ignore_ascii_case(wanted) || a.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// Attribute values container.
///
/// Serialized as a map keyed by abbreviation (`{"STR": 5, ...}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "STR")]
    pub strength: u32,
    #[serde(rename = "PER")]
    pub perception: u32,
    #[serde(rename = "DEX")]
    pub dexterity: u32,
    #[serde(rename = "MEM")]
    pub memory: u32,
    #[serde(rename = "INT")]
    pub intelligence: u32,
    #[serde(rename = "CHA")]
    pub charisma: u32,
}

impl Attributes {
    pub fn new(str: u32, per: u32, dex: u32, mem: u32, int: u32, cha: u32) -> Self {
        Self {
            strength: str,
            perception: per,
            dexterity: dex,
            memory: mem,
            intelligence: int,
            charisma: cha,
        }
    }

    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Perception => self.perception,
            Attribute::Dexterity => self.dexterity,
            Attribute::Memory => self.memory,
            Attribute::Intelligence => self.intelligence,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: u32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Perception => self.perception = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Memory => self.memory = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Charisma => self.charisma = value,
        }
    }

    /// Points committed above the floor across all attributes.
    pub fn spent_points(&self) -> u32 {
        Attribute::all()
            .iter()
            .map(|a| self.get(*a).saturating_sub(ATTRIBUTE_FLOOR))
            .fold(0, u32::saturating_add)
    }

    /// The lowest attribute and its value, if any sits below the floor.
    pub fn below_floor(&self) -> Option<(Attribute, u32)> {
        Attribute::all()
            .into_iter()
            .map(|a| (a, self.get(a)))
            .find(|(_, v)| *v < ATTRIBUTE_FLOOR)
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(
            ATTRIBUTE_FLOOR,
            ATTRIBUTE_FLOOR,
            ATTRIBUTE_FLOOR,
            ATTRIBUTE_FLOOR,
            ATTRIBUTE_FLOOR,
            ATTRIBUTE_FLOOR,
        )
    }
}

// ============================================================================
// Character
// ============================================================================

/// A LitRPG character record.
///
/// This is the only persisted aggregate. Transient reward selections and the
/// pending-reward queue live with the caller (see [`crate::session`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub level: u32,
    /// Total accumulated experience. Never decreases.
    pub xp: u64,
    pub credits: u64,
    #[serde(rename = "class")]
    pub class_name: String,
    pub attributes: Attributes,
    /// Learned abilities by id. Absence means not learned.
    pub abilities: BTreeMap<String, u32>,
    /// Abilities granted by an ability disk; their first level is free.
    #[serde(default)]
    pub installed_abilities: BTreeSet<String>,
    pub inventory: Vec<String>,
    /// Event log, newest first.
    pub history: Vec<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
            xp: 0,
            credits: 0,
            class_name: class_name.into(),
            attributes: Attributes::default(),
            abilities: BTreeMap::new(),
            installed_abilities: BTreeSet::new(),
            inventory: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn attribute(&self, attribute: Attribute) -> u32 {
        self.attributes.get(attribute)
    }

    pub fn ability_level(&self, ability_id: &str) -> Option<u32> {
        self.abilities.get(ability_id).copied()
    }

    pub fn knows_ability(&self, ability_id: &str) -> bool {
        self.abilities.contains_key(ability_id)
    }

    /// Ability points committed to learned abilities.
    ///
    /// The first level of a disk-installed ability is not counted.
    pub fn spent_ability_points(&self) -> u32 {
        self.abilities
            .iter()
            .map(|(id, level)| {
                if self.installed_abilities.contains(id) {
                    level.saturating_sub(1)
                } else {
                    *level
                }
            })
            .fold(0, u32::saturating_add)
    }

    /// Prepend an entry to the history log.
    pub fn record(&mut self, entry: impl Into<String>) {
        self.history.insert(0, entry.into());
    }
}

/// Create a sample character for testing.
///
/// A level 1 Fighter with Power Strike and the floor in every attribute.
pub fn create_sample_character(name: &str) -> Character {
    let mut character = Character::new(name, "Fighter");
    character.attributes = Attributes::new(3, 3, 3, 3, 3, 3);
    character.abilities.insert("power_strike".to_string(), 1);
    character.inventory.push("Rusty Sword".to_string());
    character.record(format!("{name} awakened as a Fighter"));
    character
}
