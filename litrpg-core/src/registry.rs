//! Class and ability registry.
//!
//! The registry is an immutable lookup table built once by
//! [`RegistryBuilder::build`] and passed around by reference. Classes form an
//! upgrade graph (`Fighter -> Knight -> Paladin`); the lineage of a class is
//! found by walking that graph backwards.

use crate::character::{Attribute, Attributes};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

/// Deepest ancestor chain accepted before the registry is considered cyclic.
pub const MAX_LINEAGE_DEPTH: usize = 32;

/// Errors from building or querying the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate class: {0}")]
    DuplicateClass(String),

    #[error("Duplicate ability: {0}")]
    DuplicateAbility(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Class {class} lists unknown ability {ability}")]
    UnknownAbility { class: String, ability: String },

    #[error("Class {class} upgrades into unknown class {upgrade}")]
    UnknownUpgrade { class: String, upgrade: String },

    #[error("Ability {ability} evolves into unknown ability {target}")]
    UnknownEvolution { ability: String, target: String },

    #[error("Ability {ability} has max level {max_level} but {tiers} tiers")]
    TierMismatch {
        ability: String,
        max_level: u32,
        tiers: usize,
    },

    #[error("Class lineage of {0} is cyclic or too deep")]
    LineageCycle(String),
}

// ============================================================================
// Abilities
// ============================================================================

/// Effect of one ability level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityTier {
    pub level: u32,
    pub effect: String,
    /// `"<number><unit>"`, or a sentinel such as `"Instant"`.
    pub cooldown: Option<String>,
    /// `"<number><unit>"`, `"Instant"` or `"Toggle"`.
    pub duration: Option<String>,
}

/// What an ability turns into once mastered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evolution {
    #[default]
    Final,
    EvolvesTo(String),
}

impl Evolution {
    pub fn target(&self) -> Option<&str> {
        match self {
            Evolution::Final => None,
            Evolution::EvolvesTo(id) => Some(id),
        }
    }
}

/// A learnable ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_level: u32,
    /// One tier per level, `tiers[0]` is level 1.
    pub tiers: Vec<AbilityTier>,
    pub evolution: Evolution,
}

impl AbilityDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            max_level: 0,
            tiers: Vec::new(),
            evolution: Evolution::Final,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append the next tier. Raises `max_level` to match.
    pub fn with_tier(
        mut self,
        effect: impl Into<String>,
        cooldown: Option<&str>,
        duration: Option<&str>,
    ) -> Self {
        let level = self.tiers.len() as u32 + 1;
        self.tiers.push(AbilityTier {
            level,
            effect: effect.into(),
            cooldown: cooldown.map(str::to_string),
            duration: duration.map(str::to_string),
        });
        self.max_level = level;
        self
    }

    pub fn evolves_to(mut self, target: impl Into<String>) -> Self {
        self.evolution = Evolution::EvolvesTo(target.into());
        self
    }

    pub fn tier(&self, level: u32) -> Option<&AbilityTier> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.tiers.get(index)
    }

    /// Whether an ability at `level` can transform.
    pub fn can_evolve(&self, level: u32) -> bool {
        match &self.evolution {
            Evolution::Final => false,
            Evolution::EvolvesTo(_) => level >= self.max_level,
        }
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A character class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub description: String,
    pub starting_item: String,
    pub primary: Attribute,
    pub secondary: Attribute,
    /// Ability ids the class teaches.
    pub abilities: Vec<String>,
    /// Classes this class can tier up into.
    pub upgrades: Vec<String>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, primary: Attribute, secondary: Attribute) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            starting_item: String::new(),
            primary,
            secondary,
            abilities: Vec::new(),
            upgrades: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_starting_item(mut self, item: impl Into<String>) -> Self {
        self.starting_item = item.into();
        self
    }

    pub fn with_abilities<I, S>(mut self, abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abilities.extend(abilities.into_iter().map(Into::into));
        self
    }

    pub fn with_upgrades<I, S>(mut self, upgrades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upgrades.extend(upgrades.into_iter().map(Into::into));
        self
    }

    pub fn upgrades_into(&self, class_name: &str) -> bool {
        self.upgrades.iter().any(|u| u == class_name)
    }

    /// XP multiplier from the class's primary and secondary attributes.
    ///
    /// `1 + primary/100 + 0.6 * secondary/100`
    pub fn bonus_multiplier(&self, attributes: &Attributes) -> f64 {
        1.0 + f64::from(attributes.get(self.primary)) / 100.0
            + 0.6 * f64::from(attributes.get(self.secondary)) / 100.0
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Collects class and ability definitions and validates them.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    classes: Vec<ClassDef>,
    abilities: Vec<AbilityDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: ClassDef) -> Self {
        self.classes.push(class);
        self
    }

    pub fn ability(mut self, ability: AbilityDef) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Check every cross reference and produce the lookup tables.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut abilities = BTreeMap::new();
        for ability in self.abilities {
            if ability.max_level == 0 || ability.tiers.len() != ability.max_level as usize {
                return Err(RegistryError::TierMismatch {
                    ability: ability.id,
                    max_level: ability.max_level,
                    tiers: ability.tiers.len(),
                });
            }
            if abilities.contains_key(&ability.id) {
                return Err(RegistryError::DuplicateAbility(ability.id));
            }
            abilities.insert(ability.id.clone(), ability);
        }

        for ability in abilities.values() {
            if let Evolution::EvolvesTo(target) = &ability.evolution {
                if !abilities.contains_key(target) {
                    return Err(RegistryError::UnknownEvolution {
                        ability: ability.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let mut classes = BTreeMap::new();
        for class in self.classes {
            if classes.contains_key(&class.name) {
                return Err(RegistryError::DuplicateClass(class.name));
            }
            if let Some(missing) = class.abilities.iter().find(|a| !abilities.contains_key(*a)) {
                return Err(RegistryError::UnknownAbility {
                    class: class.name.clone(),
                    ability: missing.clone(),
                });
            }
            classes.insert(class.name.clone(), class);
        }

        for class in classes.values() {
            if let Some(missing) = class.upgrades.iter().find(|u| !classes.contains_key(*u)) {
                return Err(RegistryError::UnknownUpgrade {
                    class: class.name.clone(),
                    upgrade: missing.clone(),
                });
            }
        }

        Ok(Registry { classes, abilities })
    }
}

/// Immutable class and ability lookup.
#[derive(Debug, Clone)]
pub struct Registry {
    classes: BTreeMap<String, ClassDef>,
    abilities: BTreeMap<String, AbilityDef>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn ability(&self, id: &str) -> Option<&AbilityDef> {
        self.abilities.get(id)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.values()
    }

    pub fn abilities(&self) -> impl Iterator<Item = &AbilityDef> {
        self.abilities.values()
    }

    /// The class that upgrades into `class_name`, if any.
    ///
    /// When several classes list the same upgrade, the first by name wins.
    pub fn parent_of(&self, class_name: &str) -> Option<&ClassDef> {
        self.classes.values().find(|c| c.upgrades_into(class_name))
    }

    /// Classes `class_name` can tier up into.
    pub fn upgrades_of(&self, class_name: &str) -> Vec<&ClassDef> {
        self.class(class_name)
            .map(|c| c.upgrades.iter().filter_map(|u| self.class(u)).collect())
            .unwrap_or_default()
    }

    /// Ancestor chain of a class, root first, ending with the class itself.
    pub fn lineage(&self, class_name: &str) -> Result<Vec<&ClassDef>, RegistryError> {
        let start = self
            .class(class_name)
            .ok_or_else(|| RegistryError::UnknownClass(class_name.to_string()))?;

        let mut chain = vec![start];
        let mut seen = BTreeSet::from([start.name.as_str()]);
        let mut current = start;

        while let Some(parent) = self.parent_of(&current.name) {
            if !seen.insert(parent.name.as_str()) || chain.len() >= MAX_LINEAGE_DEPTH {
                warn!(class = class_name, "Class lineage does not terminate");
                return Err(RegistryError::LineageCycle(class_name.to_string()));
            }
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Abilities a character of `class_name` can see.
    ///
    /// Every lineage class's abilities in lineage order, followed by learned
    /// abilities from outside the lineage (ability disks).
    pub fn visible_abilities(
        &self,
        class_name: &str,
        learned: &BTreeMap<String, u32>,
    ) -> Result<Vec<&AbilityDef>, RegistryError> {
        let mut seen = BTreeSet::new();
        let mut visible = Vec::new();

        let lineage_ids = self
            .lineage(class_name)?
            .into_iter()
            .flat_map(|c| c.abilities.iter());

        for id in lineage_ids.chain(learned.keys()) {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match self.ability(id) {
                Some(ability) => visible.push(ability),
                None => warn!(ability = %id, "Learned ability is not registered"),
            }
        }

        Ok(visible)
    }

    /// The stock classes and abilities.
    pub fn builtin() -> Result<Self, RegistryError> {
        crate::class_data::builtin_registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_ability(id: &str) -> AbilityDef {
        AbilityDef::new(id, id).with_tier("Does a thing", Some("10s"), None)
    }

    fn class(name: &str) -> ClassDef {
        ClassDef::new(name, Attribute::Strength, Attribute::Dexterity)
    }

    #[test]
    fn test_builtin_registry_builds() {
        let registry = Registry::builtin().expect("builtin registry is valid");
        assert!(registry.class("Fighter").is_some());
        assert!(registry.ability("power_strike").is_some());
    }

    #[test]
    fn test_lineage_root_first() {
        let registry = Registry::builtin().unwrap();
        let names: Vec<_> = registry
            .lineage("Paladin")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Fighter", "Knight", "Paladin"]);

        let root: Vec<_> = registry
            .lineage("Mage")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(root, vec!["Mage"]);
    }

    #[test]
    fn test_lineage_unknown_class() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(
            registry.lineage("Bard").unwrap_err(),
            RegistryError::UnknownClass("Bard".to_string())
        );
    }

    #[test]
    fn test_lineage_cycle_is_error() {
        let registry = Registry::builder()
            .ability(simple_ability("a"))
            .class(class("Alpha").with_upgrades(["Beta"]))
            .class(class("Beta").with_upgrades(["Gamma"]))
            .class(class("Gamma").with_upgrades(["Alpha"]))
            .build()
            .expect("cycles are only detected on lineage walks");

        assert_eq!(
            registry.lineage("Beta").unwrap_err(),
            RegistryError::LineageCycle("Beta".to_string())
        );
    }

    #[test]
    fn test_lineage_self_upgrade_is_cycle() {
        let registry = Registry::builder()
            .class(class("Loop").with_upgrades(["Loop"]))
            .build()
            .unwrap();
        assert!(matches!(
            registry.lineage("Loop"),
            Err(RegistryError::LineageCycle(_))
        ));
    }

    #[test]
    fn test_lineage_depth_cap() {
        let mut builder = Registry::builder();
        for i in 0..(MAX_LINEAGE_DEPTH + 5) {
            builder = builder
                .class(class(&format!("Tier{i:03}")).with_upgrades([format!("Tier{:03}", i + 1)]));
        }
        builder = builder.class(class(&format!("Tier{:03}", MAX_LINEAGE_DEPTH + 5)));
        let registry = builder.build().unwrap();

        assert!(registry.lineage("Tier010").is_ok());
        assert!(matches!(
            registry.lineage(&format!("Tier{:03}", MAX_LINEAGE_DEPTH + 5)),
            Err(RegistryError::LineageCycle(_))
        ));
    }

    #[test]
    fn test_visible_abilities_union() {
        let registry = Registry::builtin().unwrap();
        let mut learned = BTreeMap::new();
        learned.insert("power_strike".to_string(), 2);
        learned.insert("fireball".to_string(), 1);

        let ids: Vec<_> = registry
            .visible_abilities("Knight", &learned)
            .unwrap()
            .iter()
            .map(|a| a.id.as_str())
            .collect();

        assert_eq!(
            ids,
            vec!["power_strike", "second_wind", "shield_wall", "rallying_cry", "fireball"]
        );
    }

    #[test]
    fn test_build_rejects_bad_references() {
        let err = Registry::builder()
            .class(class("Fighter").with_abilities(["missing"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAbility { .. }));

        let err = Registry::builder()
            .class(class("Fighter").with_upgrades(["Nobody"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownUpgrade { .. }));

        let err = Registry::builder()
            .ability(simple_ability("spark").evolves_to("inferno"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownEvolution { .. }));

        let err = Registry::builder()
            .ability(AbilityDef::new("empty", "Empty"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::TierMismatch { .. }));

        let err = Registry::builder()
            .ability(simple_ability("spark"))
            .ability(simple_ability("spark"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAbility("spark".to_string()));
    }

    #[test]
    fn test_evolution_only_at_max_level() {
        let registry = Registry::builtin().unwrap();
        let fireball = registry.ability("fireball").unwrap();
        assert_eq!(fireball.evolution.target(), Some("meteor"));
        assert!(!fireball.can_evolve(fireball.max_level - 1));
        assert!(fireball.can_evolve(fireball.max_level));

        let meteor = registry.ability("meteor").unwrap();
        assert!(!meteor.can_evolve(meteor.max_level));
    }

    #[test]
    fn test_tier_lookup() {
        let ability = simple_ability("spark").with_tier("Bigger", Some("8s"), Some("Toggle"));
        assert_eq!(ability.max_level, 2);
        assert_eq!(ability.tier(2).unwrap().effect, "Bigger");
        assert!(ability.tier(0).is_none());
        assert!(ability.tier(3).is_none());
    }

    #[test]
    fn test_bonus_multiplier() {
        let class = ClassDef::new("Test", Attribute::Strength, Attribute::Dexterity);
        let attrs = Attributes::new(10, 3, 5, 3, 3, 3);
        assert!((class.bonus_multiplier(&attrs) - 1.13).abs() < 1e-9);
    }
}
