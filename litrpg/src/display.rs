//! Plain-text rendering of sheets, reports and tables.

use litrpg_core::modifiers::ScaledTier;
use litrpg_core::{
    Attribute, Catalog, Character, LevelUpReport, ProgressionRules, Registry, RewardResult,
};

/// Print the full character sheet.
pub fn print_sheet(character: &Character, registry: &Registry, rules: &ProgressionRules) {
    let budget = rules.available_points(character);

    println!("[CHARACTER]");
    println!("  {} - Level {} {}", character.name, character.level, character.class_name);
    match rules.xp_to_next_level(character) {
        Some(missing) => println!("  XP: {} ({} to next level)", character.xp, missing),
        None => println!("  XP: {} (max level)", character.xp),
    }
    println!("  Credits: {}", character.credits);

    println!("[ATTRIBUTES] {} points available", budget.attribute_points);
    for attribute in Attribute::all() {
        println!("  {:<4}{:>4}", attribute.abbreviation(), character.attribute(attribute));
    }

    println!("[ABILITIES] {} points available", budget.ability_points);
    match registry.visible_abilities(&character.class_name, &character.abilities) {
        Ok(abilities) => {
            for ability in abilities {
                let level = character.ability_level(&ability.id).unwrap_or(0);
                let disk = if character.installed_abilities.contains(&ability.id) {
                    " [disk]"
                } else {
                    ""
                };
                println!("  {} {}/{}{}", ability.name, level, ability.max_level, disk);

                if let Some(tier) = ability.tier(level) {
                    let scaled = rules.scale_tier(tier, &character.attributes);
                    println!("    {}{}", tier.effect, format_times(&scaled));
                }
                if ability.can_evolve(level) {
                    if let Some(target) = ability.evolution.target().and_then(|t| registry.ability(t)) {
                        println!("    Ready to evolve into {}", target.name);
                    }
                }
            }
        }
        Err(err) => println!("  [ERROR] {err}"),
    }

    if !character.inventory.is_empty() {
        println!("[INVENTORY]");
        for item in &character.inventory {
            println!("  {item}");
        }
    }

    if !character.history.is_empty() {
        println!("[HISTORY]");
        for entry in character.history.iter().take(10) {
            println!("  {entry}");
        }
    }
}

fn format_times(scaled: &ScaledTier) -> String {
    let mut parts = Vec::new();
    if let Some(cooldown) = &scaled.cooldown {
        parts.push(format!("cooldown {cooldown}"));
    }
    if let Some(duration) = &scaled.duration {
        parts.push(format!("duration {duration}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

/// Print the outcome of an applied reward.
pub fn print_reward(result: &RewardResult, report: &LevelUpReport) {
    println!("[REWARD] {}", result.description);
    println!("  +{} XP, +{} Credits", result.xp, result.credits);
    if !result.loot_summary.is_empty() {
        println!("  Loot: {}", result.loot_summary);
    }
    if report.leveled_up() {
        println!(
            "[LEVEL UP] {} -> {} (+{} attribute points, +{} ability points)",
            report.previous_level, report.new_level, report.attribute_points, report.ability_points
        );
        for unlock in &report.unlocks {
            println!("  Unlocked: {unlock}");
        }
    }
}

/// Print every class with its lineage and upgrades.
pub fn print_classes(registry: &Registry) {
    println!("[CLASSES]");
    for class in registry.classes() {
        let lineage = match registry.lineage(&class.name) {
            Ok(chain) => chain
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(" > "),
            Err(err) => format!("[ERROR] {err}"),
        };
        println!("  {} ({}/{}): {}", class.name, class.primary, class.secondary, lineage);
        if !class.upgrades.is_empty() {
            println!("    Upgrades: {}", class.upgrades.join(", "));
        }
    }
}

/// Print the monster and loot catalog.
pub fn print_catalog(catalog: &Catalog) {
    println!("[MONSTERS]");
    for monster in catalog.monsters() {
        println!(
            "  {:<14} Lv {:>3} {:<8} {:>5} XP {:>5} Credits  {}",
            monster.id, monster.level, monster.rank.name(), monster.xp_reward, monster.credits, monster.name
        );
    }
    println!("[LOOT]");
    for item in catalog.items() {
        println!("  {:<18} {}", item.id, item.name);
    }
}
