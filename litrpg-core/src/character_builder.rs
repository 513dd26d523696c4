//! Character builder for new LitRPG characters.
//!
//! Provides a step-by-step builder that validates the class, attributes and
//! starting abilities against the registry and the point budget.

use crate::character::{Attribute, Attributes, Character};
use crate::registry::{Registry, RegistryError};
use crate::rules::ProgressionRules;
use thiserror::Error;
use tracing::info;

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Character name is required")]
    MissingName,

    #[error("Class selection is required")]
    MissingClass,

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Starting level {level} is outside 1..={max_level}")]
    InvalidLevel { level: u32, max_level: u32 },

    #[error("{attribute} is {value}, below the minimum of 3")]
    AttributeBelowFloor { attribute: Attribute, value: u32 },

    #[error("Attributes use {spent} points but only {available} are available")]
    AttributeBudgetExceeded { spent: u32, available: u32 },

    #[error("Ability {0} is not available for this class")]
    AbilityNotAvailable(String),

    #[error("Ability {id} cannot go above level {max_level}")]
    AbilityAboveMaxLevel { id: String, max_level: u32 },

    #[error("Abilities use {spent} points but only {available} are available")]
    AbilityBudgetExceeded { spent: u32, available: u32 },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builder for creating characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: Option<String>,
    class: Option<String>,
    level: Option<u32>,
    attributes: Option<Attributes>,
    abilities: Vec<String>,
}

impl CharacterBuilder {
    /// Create a new character builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the character's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the character's starting class.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Start above level 1, with the XP that level requires.
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the attribute values. Defaults to 3 in every attribute.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Learn an ability at level 1.
    pub fn ability(mut self, ability_id: impl Into<String>) -> Self {
        self.abilities.push(ability_id.into());
        self
    }

    /// Build the character, returning an error if anything is missing or
    /// over budget.
    pub fn build(
        self,
        registry: &Registry,
        rules: &ProgressionRules,
    ) -> Result<Character, BuilderError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(BuilderError::MissingName)?;
        let class_name = self.class.ok_or(BuilderError::MissingClass)?;
        let class = registry
            .class(&class_name)
            .ok_or_else(|| BuilderError::UnknownClass(class_name.clone()))?;

        let level = self.level.unwrap_or(1);
        if level == 0 || level > rules.max_level {
            return Err(BuilderError::InvalidLevel {
                level,
                max_level: rules.max_level,
            });
        }
        let budget = rules.cumulative_points(level);

        // Validate attributes
        let attributes = self.attributes.unwrap_or_default();
        if let Some((attribute, value)) = attributes.below_floor() {
            return Err(BuilderError::AttributeBelowFloor { attribute, value });
        }
        let spent = attributes.spent_points();
        if spent > budget.attribute_points {
            return Err(BuilderError::AttributeBudgetExceeded {
                spent,
                available: budget.attribute_points,
            });
        }

        // Validate starting abilities
        let mut character = Character::new(name, class.name.clone());
        let visible = registry.visible_abilities(&class.name, &character.abilities)?;
        for ability_id in &self.abilities {
            if !visible.iter().any(|a| &a.id == ability_id) {
                return Err(BuilderError::AbilityNotAvailable(ability_id.clone()));
            }
            *character.abilities.entry(ability_id.clone()).or_insert(0) += 1;
        }
        for (id, learned) in &character.abilities {
            if let Some(ability) = registry.ability(id) {
                if *learned > ability.max_level {
                    return Err(BuilderError::AbilityAboveMaxLevel {
                        id: id.clone(),
                        max_level: ability.max_level,
                    });
                }
            }
        }
        let spent = character.spent_ability_points();
        if spent > budget.ability_points {
            return Err(BuilderError::AbilityBudgetExceeded {
                spent,
                available: budget.ability_points,
            });
        }

        // Build the character
        character.level = level;
        character.xp = rules.total_xp_required(level);
        character.attributes = attributes;
        if !class.starting_item.is_empty() {
            character.inventory.push(class.starting_item.clone());
        }
        character.record(format!("{} awakened as a {}", character.name, class.name));

        info!(character = %character.name, class = %class.name, level, "Character created");
        Ok(character)
    }
}
