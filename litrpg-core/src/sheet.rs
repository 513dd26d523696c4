//! Point allocation and class changes on a character sheet.
//!
//! Allocation actions never fail loudly: a refused action leaves the
//! character untouched, logs the reason at `debug`, and returns `false`.
//! Only class changes, which the user picks by name, return an error.

use crate::character::{Attribute, Character, ATTRIBUTE_FLOOR};
use crate::progression::PointBudget;
use crate::registry::{AbilityDef, Registry, RegistryError};
use crate::rules::ProgressionRules;
use thiserror::Error;
use tracing::{debug, info};

/// Error from changing class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("{from} cannot become {to}")]
    NotAnUpgrade { from: String, to: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Mutable view of a character with the tables needed to validate edits.
pub struct CharacterSheet<'a> {
    character: &'a mut Character,
    registry: &'a Registry,
    rules: &'a ProgressionRules,
}

impl<'a> CharacterSheet<'a> {
    pub fn new(
        character: &'a mut Character,
        registry: &'a Registry,
        rules: &'a ProgressionRules,
    ) -> Self {
        Self {
            character,
            registry,
            rules,
        }
    }

    pub fn character(&self) -> &Character {
        self.character
    }

    pub fn available_points(&self) -> PointBudget {
        self.rules.available_points(self.character)
    }

    /// Abilities the character can see, in display order.
    pub fn visible_abilities(&self) -> Result<Vec<&'a AbilityDef>, RegistryError> {
        self.registry
            .visible_abilities(&self.character.class_name, &self.character.abilities)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Spend one attribute point.
    pub fn increment_attribute(&mut self, attribute: Attribute) -> bool {
        if self.available_points().attribute_points == 0 {
            debug!(%attribute, "No attribute points available");
            return false;
        }
        let Some(value) = self.character.attribute(attribute).checked_add(1) else {
            debug!(%attribute, "Attribute already at its maximum");
            return false;
        };
        self.character.attributes.set(attribute, value);
        true
    }

    /// Refund one attribute point. Refused at the floor.
    pub fn decrement_attribute(&mut self, attribute: Attribute) -> bool {
        let value = self.character.attribute(attribute);
        if value <= ATTRIBUTE_FLOOR {
            debug!(%attribute, value, "Attribute already at floor");
            return false;
        }
        self.character.attributes.set(attribute, value - 1);
        true
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    /// Spend one ability point to learn or raise an ability.
    pub fn level_up_ability(&mut self, ability_id: &str) -> bool {
        let visible = match self.visible_abilities() {
            Ok(visible) => visible,
            Err(err) => {
                debug!(ability = ability_id, %err, "Cannot resolve visible abilities");
                return false;
            }
        };
        let Some(ability) = visible.into_iter().find(|a| a.id == ability_id) else {
            debug!(ability = ability_id, "Ability not visible to this class");
            return false;
        };

        let current = self.character.ability_level(ability_id).unwrap_or(0);
        if current >= ability.max_level {
            debug!(ability = ability_id, current, "Ability already at max level");
            return false;
        }
        if self.available_points().ability_points == 0 {
            debug!(ability = ability_id, "No ability points available");
            return false;
        }

        self.character
            .abilities
            .insert(ability_id.to_string(), current + 1);
        true
    }

    /// Refund one ability level. Level 1 forgets the ability.
    ///
    /// Disk-installed abilities stop at level 1.
    pub fn level_down_ability(&mut self, ability_id: &str) -> bool {
        let Some(current) = self.character.ability_level(ability_id) else {
            debug!(ability = ability_id, "Ability not learned");
            return false;
        };

        if current <= 1 {
            if self.character.installed_abilities.contains(ability_id) {
                debug!(ability = ability_id, "Installed abilities cannot be forgotten");
                return false;
            }
            self.character.abilities.remove(ability_id);
        } else {
            self.character
                .abilities
                .insert(ability_id.to_string(), current - 1);
        }
        true
    }

    /// Learn an ability from a disk at level 1 without spending points.
    pub fn install_ability_disk(&mut self, ability_id: &str) -> bool {
        if self.registry.ability(ability_id).is_none() {
            debug!(ability = ability_id, "Unknown ability on disk");
            return false;
        }
        if self.character.knows_ability(ability_id) {
            debug!(ability = ability_id, "Ability already learned");
            return false;
        }

        self.character.abilities.insert(ability_id.to_string(), 1);
        self.character
            .installed_abilities
            .insert(ability_id.to_string());
        true
    }

    // ========================================================================
    // Class
    // ========================================================================

    /// Tier up into one of the current class's upgrades.
    ///
    /// Learned abilities carry over; the new class's starting item is added.
    pub fn change_class(&mut self, class_name: &str) -> Result<(), SheetError> {
        let target = self
            .registry
            .class(class_name)
            .ok_or_else(|| SheetError::UnknownClass(class_name.to_string()))?;
        let current = self
            .registry
            .class(&self.character.class_name)
            .ok_or_else(|| SheetError::UnknownClass(self.character.class_name.clone()))?;

        if !current.upgrades_into(&target.name) {
            return Err(SheetError::NotAnUpgrade {
                from: current.name.clone(),
                to: target.name.clone(),
            });
        }
        // A cyclic registry would leave the new class without a lineage
        self.registry.lineage(&target.name)?;

        let previous = std::mem::replace(&mut self.character.class_name, target.name.clone());
        if !target.starting_item.is_empty() {
            self.character.inventory.push(target.starting_item.clone());
        }
        self.character.record(format!(
            "Evolved from {previous} to {} at level {}",
            target.name, self.character.level
        ));

        info!(
            character = %self.character.name,
            from = %previous,
            to = %target.name,
            "Class changed"
        );
        Ok(())
    }
}
