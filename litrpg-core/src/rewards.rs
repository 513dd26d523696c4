//! Battle and custom reward calculation.
//!
//! Rewards go through two steps:
//! 1. `calculate_reward` turns a `RewardRequest` into a `RewardResult`
//!    without touching the character
//! 2. `resolve_reward` turns a result into `Effect`s, which
//!    `apply_reward` applies to a copy of the character
//!
//! The caller's character is only ever replaced whole.

use crate::catalog::Catalog;
use crate::character::Character;
use crate::progression::LevelUpReport;
use crate::registry::Registry;
use crate::rules::ProgressionRules;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Description used for custom rewards left blank.
pub const DEFAULT_CUSTOM_DESCRIPTION: &str = "Custom reward";

/// Prefix that marks a description as a battle.
const BATTLE_PREFIX: &str = "Defeated";

// ============================================================================
// Requests
// ============================================================================

/// Largest quantity a single selection may carry.
pub const MAX_QUANTITY: u32 = 9_999;

/// A catalog id with a quantity, e.g. `goblin:3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub quantity: u32,
}

impl Selection {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }
}

/// Error from parsing a `Selection`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionParseError {
    #[error("Selection has no id: {0:?}")]
    MissingId(String),

    #[error("Invalid quantity in selection {0:?}")]
    InvalidQuantity(String),

    #[error("Quantity {quantity} is above the limit of {MAX_QUANTITY}")]
    QuantityTooLarge { quantity: u32 },
}

impl FromStr for Selection {
    type Err = SelectionParseError;

    /// Parses `id` (quantity 1) or `id:quantity`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once(':') {
            Some((id, qty)) => (
                id.trim(),
                qty.trim()
                    .parse::<u32>()
                    .map_err(|_| SelectionParseError::InvalidQuantity(s.to_string()))?,
            ),
            None => (s.trim(), 1),
        };
        if id.is_empty() {
            return Err(SelectionParseError::MissingId(s.to_string()));
        }
        if quantity > MAX_QUANTITY {
            return Err(SelectionParseError::QuantityTooLarge { quantity });
        }
        Ok(Selection::new(id, quantity))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.quantity)
    }
}

/// Which calculation a request uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RewardMode {
    /// Monster kills, scaled by level disparity and class bonus.
    Combat { monsters: Vec<Selection> },
    /// Manual XP and credits, only split by party size.
    Custom {
        xp: u64,
        credits: u64,
        description: String,
    },
}

/// Everything needed to compute one reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRequest {
    pub mode: RewardMode,
    pub party_size: u32,
    pub loot: Vec<Selection>,
}

impl RewardRequest {
    pub fn combat(monsters: Vec<Selection>) -> Self {
        Self {
            mode: RewardMode::Combat { monsters },
            party_size: 1,
            loot: Vec::new(),
        }
    }

    pub fn custom(xp: u64, credits: u64, description: impl Into<String>) -> Self {
        Self {
            mode: RewardMode::Custom {
                xp,
                credits,
                description: description.into(),
            },
            party_size: 1,
            loot: Vec::new(),
        }
    }

    pub fn with_party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size;
        self
    }

    pub fn with_loot(mut self, loot: Vec<Selection>) -> Self {
        self.loot = loot;
        self
    }
}

/// A computed reward, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardResult {
    pub xp: u64,
    pub credits: u64,
    pub description: String,
    /// One entry per item copy, merged into the inventory.
    pub loot: Vec<String>,
    /// `"<item> (x<qty>)"` joined with `", "`, for the history log.
    pub loot_summary: String,
}

impl RewardResult {
    pub fn is_battle(&self) -> bool {
        self.description.starts_with(BATTLE_PREFIX)
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// XP scaling from the gap between monster and character level.
pub fn level_disparity_multiplier(monster_level: u32, character_level: u32) -> f64 {
    let diff = i64::from(monster_level) - i64::from(character_level);
    match diff {
        d if d <= -11 => 0.0,
        d if d <= -6 => 0.5,
        d if d <= -1 => 0.8,
        d if d <= 4 => 1.0,
        d if d <= 9 => 1.2,
        d if d <= 14 => 1.5,
        _ => 2.0,
    }
}

/// Compute XP, credits and loot for a request.
///
/// Unknown monster or item ids and zero quantities are skipped.
pub fn calculate_reward(
    request: &RewardRequest,
    character: &Character,
    registry: &Registry,
    catalog: &Catalog,
) -> RewardResult {
    let party_size = request.party_size.max(1);

    let (xp, credits, description) = match &request.mode {
        RewardMode::Combat { monsters } => {
            calculate_combat(monsters, party_size, character, registry, catalog)
        }
        RewardMode::Custom {
            xp,
            credits,
            description,
        } => {
            let description = description.trim();
            let description = if description.is_empty() {
                DEFAULT_CUSTOM_DESCRIPTION.to_string()
            } else {
                description.to_string()
            };
            // Custom rewards skip the class bonus
            (
                xp / u64::from(party_size),
                credits / u64::from(party_size),
                description,
            )
        }
    };

    let (loot, loot_summary) = expand_loot(&request.loot, catalog);

    RewardResult {
        xp,
        credits,
        description,
        loot,
        loot_summary,
    }
}

fn calculate_combat(
    monsters: &[Selection],
    party_size: u32,
    character: &Character,
    registry: &Registry,
    catalog: &Catalog,
) -> (u64, u64, String) {
    let mut total_xp = 0.0;
    let mut total_credits: u64 = 0;
    let mut defeated = Vec::new();

    for selection in monsters {
        let Some(monster) = catalog.monster(&selection.id) else {
            warn!(monster = %selection.id, "Skipping unknown monster");
            continue;
        };
        if selection.quantity == 0 {
            warn!(monster = %selection.id, "Skipping zero quantity");
            continue;
        }

        let multiplier = level_disparity_multiplier(monster.level, character.level);
        total_xp += monster.xp_reward as f64 * f64::from(selection.quantity) * multiplier;
        total_credits =
            total_credits.saturating_add(monster.credits.saturating_mul(u64::from(selection.quantity)));
        defeated.push(format!("{}x {}", selection.quantity, monster.name));
    }

    let split_xp = total_xp / f64::from(party_size);
    let split_credits = total_credits / u64::from(party_size);

    let bonus = match registry.class(&character.class_name) {
        Some(class) => class.bonus_multiplier(&character.attributes),
        None => {
            warn!(class = %character.class_name, "Unknown class, no XP bonus");
            1.0
        }
    };

    let description = if defeated.is_empty() {
        "No monsters defeated".to_string()
    } else {
        format!("{BATTLE_PREFIX} {}", defeated.join(", "))
    };

    ((split_xp * bonus).round() as u64, split_credits, description)
}

fn expand_loot(selections: &[Selection], catalog: &Catalog) -> (Vec<String>, String) {
    let mut loot = Vec::new();
    let mut summary = Vec::new();

    for selection in selections {
        let Some(item) = catalog.item(&selection.id) else {
            warn!(item = %selection.id, "Skipping unknown loot item");
            continue;
        };
        if selection.quantity == 0 {
            warn!(item = %selection.id, "Skipping zero quantity");
            continue;
        }
        let quantity = if selection.quantity > MAX_QUANTITY {
            warn!(item = %selection.id, quantity = selection.quantity, "Clamping loot quantity");
            MAX_QUANTITY
        } else {
            selection.quantity
        };
        loot.extend(std::iter::repeat(item.name.clone()).take(quantity as usize));
        summary.push(format!("{} (x{})", item.name, quantity));
    }

    (loot, summary.join(", "))
}

// ============================================================================
// Application
// ============================================================================

/// A state change produced by resolving a reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    ExperienceGained { amount: u64 },
    CreditsGained { amount: u64 },
    HistoryRecorded { entry: String },
    ItemsAdded { items: Vec<String> },
}

/// The effects of a reward and the line it writes to the history.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub narrative: String,
}

/// Build the history line for a reward.
///
/// `"[Ch. 12] Battle: Defeated 2x Goblin (+80 XP, +16 Credits) | Loot: Goblin Ear (x2)"`
pub fn compose_history_entry(result: &RewardResult, chapter: Option<&str>) -> String {
    let tag = chapter
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("[{c}] "))
        .unwrap_or_default();
    let label = if result.is_battle() { "Battle" } else { "Event" };

    let mut entry = format!(
        "{tag}{label}: {} (+{} XP, +{} Credits)",
        result.description, result.xp, result.credits
    );
    if !result.loot_summary.is_empty() {
        entry.push_str(&format!(" | Loot: {}", result.loot_summary));
    }
    entry
}

/// Turn a reward into the effects that apply it.
pub fn resolve_reward(result: &RewardResult, chapter: Option<&str>) -> Resolution {
    let narrative = compose_history_entry(result, chapter);
    let mut effects = vec![
        Effect::ExperienceGained { amount: result.xp },
        Effect::CreditsGained {
            amount: result.credits,
        },
        Effect::HistoryRecorded {
            entry: narrative.clone(),
        },
    ];
    if !result.loot.is_empty() {
        effects.push(Effect::ItemsAdded {
            items: result.loot.clone(),
        });
    }
    Resolution { effects, narrative }
}

/// Apply effects to a character, running level-ups for XP.
pub fn apply_effects(
    character: &mut Character,
    effects: &[Effect],
    rules: &ProgressionRules,
) -> LevelUpReport {
    let mut report = LevelUpReport {
        previous_level: character.level,
        new_level: character.level,
        ..Default::default()
    };

    for effect in effects {
        match effect {
            Effect::ExperienceGained { amount } => {
                let step = rules.grant_experience(character, *amount);
                report.xp_gained += step.xp_gained;
                report.new_level = step.new_level;
                report.attribute_points += step.attribute_points;
                report.ability_points += step.ability_points;
                report.unlocks.extend(step.unlocks);
            }
            Effect::CreditsGained { amount } => {
                character.credits = character.credits.saturating_add(*amount);
            }
            Effect::HistoryRecorded { entry } => {
                character.record(entry.clone());
            }
            Effect::ItemsAdded { items } => {
                character.inventory.extend(items.iter().cloned());
            }
        }
    }

    report
}

/// Apply a reward and return the updated character.
///
/// `character` itself is left untouched.
pub fn apply_reward(
    character: &Character,
    result: &RewardResult,
    chapter: Option<&str>,
    rules: &ProgressionRules,
) -> (Character, LevelUpReport) {
    let resolution = resolve_reward(result, chapter);
    let mut updated = character.clone();
    let report = apply_effects(&mut updated, &resolution.effects, rules);

    info!(
        character = %updated.name,
        xp = result.xp,
        credits = result.credits,
        "{}",
        resolution.narrative
    );

    (updated, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Monster, Rank};
    use crate::character::{create_sample_character, Attribute};

    fn test_catalog() -> Catalog {
        Catalog::builtin()
            .with_monster(Monster::new("sparring_dummy", "Sparring Dummy", 15, Rank::Regular, 100, 50))
            .with_monster(Monster::new("imp", "Imp", 18, Rank::Trash, 30, 5))
    }

    fn level_15_fighter() -> Character {
        let mut character = create_sample_character("Zorian");
        character.level = 15;
        character.attributes.set(Attribute::Strength, 10);
        character.attributes.set(Attribute::Dexterity, 5);
        character
    }

    #[test]
    fn test_disparity_breakpoints() {
        assert_eq!(level_disparity_multiplier(1, 20), 0.0);
        assert_eq!(level_disparity_multiplier(10, 15), 0.5);
        assert_eq!(level_disparity_multiplier(14, 15), 0.8);
        assert_eq!(level_disparity_multiplier(15, 15), 1.0);
        assert_eq!(level_disparity_multiplier(20, 15), 1.2);
        assert_eq!(level_disparity_multiplier(25, 15), 1.5);
        assert_eq!(level_disparity_multiplier(40, 15), 2.0);
    }

    #[test]
    fn test_disparity_edges() {
        assert_eq!(level_disparity_multiplier(4, 15), 0.0); // -11
        assert_eq!(level_disparity_multiplier(5, 15), 0.5); // -10
        assert_eq!(level_disparity_multiplier(9, 15), 0.5); // -6
        assert_eq!(level_disparity_multiplier(19, 15), 1.0); // +4
        assert_eq!(level_disparity_multiplier(24, 15), 1.2); // +9
        assert_eq!(level_disparity_multiplier(29, 15), 1.5); // +14
        assert_eq!(level_disparity_multiplier(30, 15), 2.0); // +15
    }

    #[test]
    fn test_combat_reward_example() {
        let registry = Registry::builtin().unwrap();
        let character = level_15_fighter();
        let request = RewardRequest::combat(vec![Selection::new("sparring_dummy", 2)])
            .with_party_size(2);

        let result = calculate_reward(&request, &character, &registry, &test_catalog());

        assert_eq!(result.xp, 113);
        assert_eq!(result.credits, 50);
        assert_eq!(result.description, "Defeated 2x Sparring Dummy");
        assert!(result.is_battle());
    }

    #[test]
    fn test_combat_credits_floor_and_multiple_groups() {
        let registry = Registry::builtin().unwrap();
        let character = level_15_fighter();
        let request = RewardRequest::combat(vec![
            Selection::new("sparring_dummy", 1),
            Selection::new("imp", 3),
        ])
        .with_party_size(3);

        let result = calculate_reward(&request, &character, &registry, &test_catalog());

        // (100 + 30 * 3 * 1.0) / 3 * 1.13 = 71.566..
        assert_eq!(result.xp, 72);
        // (50 + 15) / 3 floored
        assert_eq!(result.credits, 21);
        assert_eq!(result.description, "Defeated 1x Sparring Dummy, 3x Imp");
    }

    #[test]
    fn test_unknown_ids_skipped() {
        let registry = Registry::builtin().unwrap();
        let character = level_15_fighter();
        let request = RewardRequest::combat(vec![
            Selection::new("dragon", 1),
            Selection::new("sparring_dummy", 1),
            Selection::new("imp", 0),
        ])
        .with_loot(vec![Selection::new("potion", 2), Selection::new("excalibur", 1)]);

        let result = calculate_reward(&request, &character, &registry, &test_catalog());

        assert_eq!(result.description, "Defeated 1x Sparring Dummy");
        assert_eq!(result.loot, vec!["Health Potion", "Health Potion"]);
        assert_eq!(result.loot_summary, "Health Potion (x2)");
    }

    #[test]
    fn test_trivial_monsters_give_no_xp() {
        let registry = Registry::builtin().unwrap();
        let character = level_15_fighter();
        let request = RewardRequest::combat(vec![Selection::new("rat", 10)]);
        let result = calculate_reward(&request, &character, &registry, &test_catalog());
        assert_eq!(result.xp, 0);
        assert_eq!(result.credits, 10);
    }

    #[test]
    fn test_custom_reward_skips_class_bonus() {
        let registry = Registry::builtin().unwrap();
        let character = level_15_fighter();
        let request = RewardRequest::custom(101, 51, "  Won the tournament ").with_party_size(2);

        let result = calculate_reward(&request, &character, &registry, &test_catalog());

        assert_eq!(result.xp, 50);
        assert_eq!(result.credits, 25);
        assert_eq!(result.description, "Won the tournament");
        assert!(!result.is_battle());
    }

    #[test]
    fn test_custom_reward_default_description_and_zero_party() {
        let registry = Registry::builtin().unwrap();
        let character = level_15_fighter();
        let request = RewardRequest::custom(10, 4, "   ").with_party_size(0);

        let result = calculate_reward(&request, &character, &registry, &test_catalog());

        assert_eq!(result.xp, 10);
        assert_eq!(result.credits, 4);
        assert_eq!(result.description, DEFAULT_CUSTOM_DESCRIPTION);
    }

    #[test]
    fn test_compose_history_entry() {
        let result = RewardResult {
            xp: 113,
            credits: 50,
            description: "Defeated 2x Goblin".to_string(),
            loot: vec!["Goblin Ear".to_string(), "Goblin Ear".to_string()],
            loot_summary: "Goblin Ear (x2)".to_string(),
        };
        assert_eq!(
            compose_history_entry(&result, Some("Ch. 12")),
            "[Ch. 12] Battle: Defeated 2x Goblin (+113 XP, +50 Credits) | Loot: Goblin Ear (x2)"
        );

        let event = RewardResult {
            xp: 5,
            credits: 0,
            description: "Found a shrine".to_string(),
            loot: vec![],
            loot_summary: String::new(),
        };
        assert_eq!(
            compose_history_entry(&event, Some("  ")),
            "Event: Found a shrine (+5 XP, +0 Credits)"
        );
        assert_eq!(
            compose_history_entry(&event, None),
            "Event: Found a shrine (+5 XP, +0 Credits)"
        );
    }

    #[test]
    fn test_apply_reward_updates_everything() {
        let rules = ProgressionRules::default();
        let character = create_sample_character("Zorian");
        let result = RewardResult {
            xp: rules.total_xp_required(3),
            credits: 75,
            description: "Defeated 3x Goblin".to_string(),
            loot: vec!["Goblin Ear".to_string(), "Goblin Ear".to_string()],
            loot_summary: "Goblin Ear (x2)".to_string(),
        };

        let (updated, report) = apply_reward(&character, &result, Some("Ch. 1"), &rules);

        assert_eq!(updated.level, 3);
        assert_eq!(report.levels_gained(), 2);
        assert_eq!(updated.xp, rules.total_xp_required(3));
        assert_eq!(updated.credits, 75);
        assert!(updated.history[0].starts_with("[Ch. 1] Battle: Defeated 3x Goblin"));
        assert_eq!(updated.history.len(), character.history.len() + 1);
        assert_eq!(&updated.inventory[character.inventory.len()..], ["Goblin Ear", "Goblin Ear"]);

        // The input value is untouched
        assert_eq!(character.level, 1);
        assert_eq!(character.credits, 0);
    }

    #[test]
    fn test_resolve_reward_effects() {
        let result = RewardResult {
            xp: 10,
            credits: 2,
            description: "Defeated 1x Goblin".to_string(),
            loot: vec![],
            loot_summary: String::new(),
        };
        let resolution = resolve_reward(&result, None);
        assert_eq!(resolution.effects.len(), 3);
        assert!(resolution
            .effects
            .iter()
            .all(|e| !matches!(e, Effect::ItemsAdded { .. })));
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!("goblin:3".parse::<Selection>().unwrap(), Selection::new("goblin", 3));
        assert_eq!("potion".parse::<Selection>().unwrap(), Selection::new("potion", 1));
        assert!(matches!(
            "goblin:x".parse::<Selection>(),
            Err(SelectionParseError::InvalidQuantity(_))
        ));
        assert!(matches!(
            ":2".parse::<Selection>(),
            Err(SelectionParseError::MissingId(_))
        ));
        assert_eq!("goblin_ear:9999".parse::<Selection>().unwrap().quantity, MAX_QUANTITY);
        assert_eq!(
            "goblin_ear:4294967295".parse::<Selection>(),
            Err(SelectionParseError::QuantityTooLarge { quantity: u32::MAX })
        );
    }

    #[test]
    fn test_huge_loot_quantity_clamped() {
        let registry = Registry::builtin().unwrap();
        let catalog = Catalog::builtin();
        let character = create_sample_character("Zorian");
        let request = RewardRequest::custom(0, 0, "Hoard")
            .with_loot(vec![Selection::new("goblin_ear", u32::MAX)]);

        let result = calculate_reward(&request, &character, &registry, &catalog);
        assert_eq!(result.loot.len(), MAX_QUANTITY as usize);
        assert_eq!(result.loot_summary, "Goblin Ear (x9999)");
    }
}
