//! Tunable progression rules.
//!
//! `ProgressionRules` carries every number the engine uses: the XP curve,
//! per-level point rewards, unlock labels, and the cooldown/duration curves.
//! Defaults reproduce the stock character sheet; a TOML file can override
//! any subset of fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating rules.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid rules: {0}")]
    Invalid(String),
}

/// Highest `max_level` a rules file may set.
pub const LEVEL_CAP_LIMIT: u32 = 100_000;

/// A feature label granted on reaching a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub level: u32,
    pub label: String,
}

impl Unlock {
    pub fn new(level: u32, label: impl Into<String>) -> Self {
        Self {
            level,
            label: label.into(),
        }
    }
}

/// Numeric rules for XP, point budgets and stat-driven modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    /// Multiplier of the per-level XP cost.
    pub xp_base: f64,
    /// Exponent of the per-level XP cost.
    pub xp_exponent: f64,
    /// Hard level cap; also bounds the level-up loop.
    pub max_level: u32,

    /// Ability points granted on reaching level 1.
    pub starting_ability_points: u32,
    /// Attribute points granted per level from level 2.
    pub attribute_points_per_level: u32,
    /// Ability points granted per level from level 2.
    pub ability_points_per_level: u32,
    /// Every `milestone_interval` levels grants the milestone bonuses.
    pub milestone_interval: u32,
    pub milestone_attribute_bonus: u32,
    pub milestone_ability_bonus: u32,
    /// Feature unlock labels.
    pub unlocks: Vec<Unlock>,

    /// Asymptotic cap of cooldown reduction (exclusive).
    pub cooldown_cap: f64,
    /// MEM value at which half the cap is reached.
    pub cooldown_half: f64,
    /// Asymptotic cap of duration extension (exclusive).
    pub duration_cap: f64,
    /// INT value at which half the cap is reached.
    pub duration_half: f64,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            xp_base: 100.0,
            xp_exponent: 1.5,
            max_level: 999,
            starting_ability_points: 1,
            attribute_points_per_level: 3,
            ability_points_per_level: 1,
            milestone_interval: 5,
            milestone_attribute_bonus: 2,
            milestone_ability_bonus: 1,
            unlocks: vec![
                Unlock::new(5, "Class Evolution"),
                Unlock::new(10, "Ability Evolution"),
                Unlock::new(20, "Second Class Evolution"),
            ],
            cooldown_cap: 0.5,
            cooldown_half: 50.0,
            duration_cap: 1.0,
            duration_half: 50.0,
        }
    }
}

impl ProgressionRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from TOML text. Missing fields keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let rules: Self = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set the XP curve.
    pub fn with_xp_curve(mut self, base: f64, exponent: f64) -> Self {
        self.xp_base = base;
        self.xp_exponent = exponent;
        self
    }

    /// Set the level cap.
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Add an unlock label.
    pub fn with_unlock(mut self, level: u32, label: impl Into<String>) -> Self {
        self.unlocks.push(Unlock::new(level, label));
        self
    }

    /// Check that the curves are well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.xp_base.is_finite() && self.xp_base > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "xp_base must be positive, got {}",
                self.xp_base
            )));
        }
        if !(self.xp_exponent.is_finite() && self.xp_exponent > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "xp_exponent must be positive, got {}",
                self.xp_exponent
            )));
        }
        if !(1..=LEVEL_CAP_LIMIT).contains(&self.max_level) {
            return Err(ConfigError::Invalid(format!(
                "max_level must be in 1..={LEVEL_CAP_LIMIT}, got {}",
                self.max_level
            )));
        }
        // Thresholds must stay strictly increasing up to the cap
        let total = (1..self.max_level).try_fold(0u64, |total, level| {
            total
                .checked_add(self.xp_for_level_step(level))
                .filter(|t| *t < u64::MAX)
        });
        if total.is_none() {
            return Err(ConfigError::Invalid(format!(
                "XP curve (base {}, exponent {}) overflows before level {}",
                self.xp_base, self.xp_exponent, self.max_level
            )));
        }
        if !(0.0..1.0).contains(&self.cooldown_cap) {
            return Err(ConfigError::Invalid(format!(
                "cooldown_cap must be in [0, 1), got {}",
                self.cooldown_cap
            )));
        }
        if !(self.duration_cap.is_finite() && self.duration_cap >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "duration_cap must be non-negative, got {}",
                self.duration_cap
            )));
        }
        if !(self.cooldown_half > 0.0 && self.duration_half > 0.0) {
            return Err(ConfigError::Invalid(
                "cooldown_half and duration_half must be positive".into(),
            ));
        }
        Ok(())
    }
}
