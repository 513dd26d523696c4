//! Experience curve, level rewards and point budgets.
//!
//! Levels start at 1 and cost `xp_for_level_step(level)` to leave. The
//! cumulative threshold of a level is the sum of the steps below it, so
//! `total_xp_required(1) == 0`. Each level grants a `LevelReward`; the
//! budget at a level is the sum of all rewards up to it.

use crate::character::Character;
use crate::rules::ProgressionRules;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Attribute and ability points, either earned or available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBudget {
    pub attribute_points: u32,
    pub ability_points: u32,
}

/// What reaching a single level grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReward {
    pub attribute_points: u32,
    pub ability_points: u32,
    /// Feature unlock labels.
    pub unlocks: Vec<String>,
}

/// Outcome of granting experience to a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpReport {
    pub xp_gained: u64,
    pub previous_level: u32,
    pub new_level: u32,
    /// Attribute points earned across all levels gained.
    pub attribute_points: u32,
    /// Ability points earned across all levels gained.
    pub ability_points: u32,
    /// Unlock labels in level order, oldest first.
    pub unlocks: Vec<String>,
}

impl LevelUpReport {
    pub fn levels_gained(&self) -> u32 {
        self.new_level.saturating_sub(self.previous_level)
    }

    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

impl ProgressionRules {
    // ========================================================================
    // Experience curve
    // ========================================================================

    /// XP needed to advance from `level` to `level + 1`. Never zero.
    pub fn xp_for_level_step(&self, level: u32) -> u64 {
        let cost = (self.xp_base * f64::from(level.max(1)).powf(self.xp_exponent)).round();
        // `as` saturates for out-of-range floats
        (cost as u64).max(1)
    }

    /// Total XP needed to reach `level` from level 1.
    pub fn total_xp_required(&self, level: u32) -> u64 {
        (1..level.max(1)).fold(0u64, |total, l| {
            total.saturating_add(self.xp_for_level_step(l))
        })
    }

    /// Highest level reachable with `xp`, bounded by `max_level`.
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        self.advance_level(1, xp)
    }

    /// Walk `level` upward while `xp` covers the next threshold.
    ///
    /// A single windfall can cross several levels. The walk stops at
    /// `max_level`.
    pub fn advance_level(&self, level: u32, xp: u64) -> u32 {
        let mut level = level.max(1);
        if level >= self.max_level {
            return level;
        }
        let mut next_threshold = self.total_xp_required(level);

        while level < self.max_level {
            next_threshold = next_threshold.saturating_add(self.xp_for_level_step(level));
            if xp < next_threshold {
                break;
            }
            level += 1;
        }

        level
    }

    /// XP still missing for the next level, or `None` at the cap.
    pub fn xp_to_next_level(&self, character: &Character) -> Option<u64> {
        if character.level >= self.max_level {
            return None;
        }
        Some(
            self.total_xp_required(character.level.saturating_add(1))
                .saturating_sub(character.xp),
        )
    }

    // ========================================================================
    // Level rewards and budgets
    // ========================================================================

    /// The reward for reaching exactly `level`.
    pub fn level_rewards(&self, level: u32) -> LevelReward {
        if level == 0 {
            return LevelReward::default();
        }

        let mut reward = if level == 1 {
            LevelReward {
                attribute_points: 0,
                ability_points: self.starting_ability_points,
                unlocks: Vec::new(),
            }
        } else {
            LevelReward {
                attribute_points: self.attribute_points_per_level,
                ability_points: self.ability_points_per_level,
                unlocks: Vec::new(),
            }
        };

        if self.milestone_interval > 0 && level % self.milestone_interval == 0 {
            reward.attribute_points = reward
                .attribute_points
                .saturating_add(self.milestone_attribute_bonus);
            reward.ability_points = reward
                .ability_points
                .saturating_add(self.milestone_ability_bonus);
        }

        reward.unlocks = self
            .unlocks
            .iter()
            .filter(|u| u.level == level)
            .map(|u| u.label.clone())
            .collect();

        reward
    }

    /// Points earned from level 1 through `level`.
    ///
    /// The 3-per-attribute floor is not part of the budget. Levels past
    /// `max_level` earn nothing.
    pub fn cumulative_points(&self, level: u32) -> PointBudget {
        (1..=level.min(self.max_level)).fold(PointBudget::default(), |budget, l| {
            let reward = self.level_rewards(l);
            PointBudget {
                attribute_points: budget.attribute_points.saturating_add(reward.attribute_points),
                ability_points: budget.ability_points.saturating_add(reward.ability_points),
            }
        })
    }

    /// Points the character can still spend. Never negative.
    pub fn available_points(&self, character: &Character) -> PointBudget {
        let earned = self.cumulative_points(character.level);
        PointBudget {
            attribute_points: earned
                .attribute_points
                .saturating_sub(character.attributes.spent_points()),
            ability_points: earned
                .ability_points
                .saturating_sub(character.spent_ability_points()),
        }
    }

    // ========================================================================
    // Granting experience
    // ========================================================================

    /// Add XP and process every level-up it causes.
    ///
    /// Rewards of each intermediate level are accumulated in order.
    pub fn grant_experience(&self, character: &mut Character, amount: u64) -> LevelUpReport {
        let previous_level = character.level;
        character.xp = character.xp.saturating_add(amount);
        let new_level = self.advance_level(previous_level, character.xp);

        let mut report = LevelUpReport {
            xp_gained: amount,
            previous_level,
            new_level,
            ..Default::default()
        };

        if report.leveled_up() {
            for level in (previous_level + 1)..=new_level {
                let reward = self.level_rewards(level);
                report.attribute_points =
                    report.attribute_points.saturating_add(reward.attribute_points);
                report.ability_points = report.ability_points.saturating_add(reward.ability_points);
                report.unlocks.extend(reward.unlocks);
            }

            character.level = new_level;
            info!(
                character = %character.name,
                from = previous_level,
                to = new_level,
                "Character leveled up"
            );
        }

        report
    }
}
