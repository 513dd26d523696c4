//! Stock class and ability data.
//!
//! Three starting classes (Fighter, Mage, Scout), each with an upgrade tree,
//! and the abilities they teach.

use crate::character::Attribute;
use crate::registry::{AbilityDef, ClassDef, Registry, RegistryError};

/// Build the stock registry.
pub fn builtin_registry() -> Result<Registry, RegistryError> {
    let mut builder = Registry::builder();
    for class in builtin_classes() {
        builder = builder.class(class);
    }
    for ability in builtin_abilities() {
        builder = builder.ability(ability);
    }
    builder.build()
}

fn builtin_classes() -> Vec<ClassDef> {
    vec![
        // Fighter tree
        ClassDef::new("Fighter", Attribute::Strength, Attribute::Dexterity)
            .with_description("A frontline brawler who trusts steel over spells.")
            .with_starting_item("Rusty Sword")
            .with_abilities(["power_strike", "second_wind"])
            .with_upgrades(["Knight", "Berserker"]),
        ClassDef::new("Knight", Attribute::Strength, Attribute::Charisma)
            .with_description("A sworn protector who holds the line for the party.")
            .with_starting_item("Tower Shield")
            .with_abilities(["shield_wall", "rallying_cry"])
            .with_upgrades(["Paladin"]),
        ClassDef::new("Paladin", Attribute::Charisma, Attribute::Strength)
            .with_description("A knight whose oath burns with holy light.")
            .with_starting_item("Blessed Warhammer")
            .with_abilities(["holy_smite"]),
        ClassDef::new("Berserker", Attribute::Strength, Attribute::Perception)
            .with_description("A fighter who trades caution for fury.")
            .with_starting_item("Notched Greataxe")
            .with_abilities(["blood_rage"]),
        // Mage tree
        ClassDef::new("Mage", Attribute::Intelligence, Attribute::Memory)
            .with_description("A student of the arcane with more theory than sense.")
            .with_starting_item("Cracked Wand")
            .with_abilities(["fireball", "mana_shield"])
            .with_upgrades(["Elementalist", "Chronomancer"]),
        ClassDef::new("Elementalist", Attribute::Intelligence, Attribute::Perception)
            .with_description("A mage who bends fire, frost and storm.")
            .with_starting_item("Stormglass Focus")
            .with_abilities(["meteor", "frost_nova"]),
        ClassDef::new("Chronomancer", Attribute::Memory, Attribute::Intelligence)
            .with_description("A mage who bargains with seconds.")
            .with_starting_item("Broken Hourglass")
            .with_abilities(["time_stop"]),
        // Scout tree
        ClassDef::new("Scout", Attribute::Dexterity, Attribute::Perception)
            .with_description("A quick pair of eyes ahead of the party.")
            .with_starting_item("Hunting Knife")
            .with_abilities(["quick_shot", "camouflage"])
            .with_upgrades(["Ranger"]),
        ClassDef::new("Ranger", Attribute::Perception, Attribute::Dexterity)
            .with_description("A scout who never misses twice.")
            .with_starting_item("Yew Longbow")
            .with_abilities(["volley"]),
    ]
}

fn builtin_abilities() -> Vec<AbilityDef> {
    vec![
        AbilityDef::new("power_strike", "Power Strike")
            .with_description("Put your whole weight behind a single blow.")
            .with_tier("+25% weapon damage", Some("30s"), Some("Instant"))
            .with_tier("+40% weapon damage", Some("27s"), Some("Instant"))
            .with_tier("+60% weapon damage", Some("24s"), Some("Instant"))
            .with_tier("+80% weapon damage, staggers", Some("20s"), Some("Instant"))
            .with_tier("+100% weapon damage, staggers", Some("15s"), Some("Instant"))
            .evolves_to("earthshaker"),
        AbilityDef::new("earthshaker", "Earthshaker")
            .with_description("A blow that cracks the ground around the target.")
            .with_tier("150% weapon damage in a small area", Some("45s"), Some("Instant"))
            .with_tier("200% weapon damage in a small area", Some("40s"), Some("Instant"))
            .with_tier("250% weapon damage, knocks down", Some("35s"), Some("Instant")),
        AbilityDef::new("second_wind", "Second Wind")
            .with_description("Catch your breath mid-fight.")
            .with_tier("Heal 10% max HP", Some("5m"), Some("Instant"))
            .with_tier("Heal 15% max HP", Some("4.5m"), Some("Instant"))
            .with_tier("Heal 20% max HP and cleanse bleed", Some("4m"), Some("Instant")),
        AbilityDef::new("shield_wall", "Shield Wall")
            .with_description("Brace behind your shield.")
            .with_tier("Block 30% of frontal damage", None, Some("Toggle"))
            .with_tier("Block 45% of frontal damage", None, Some("Toggle"))
            .with_tier("Block 60% of frontal damage, allies behind you too", None, Some("Toggle")),
        AbilityDef::new("rallying_cry", "Rallying Cry")
            .with_description("A shout that steadies the party.")
            .with_tier("+10% party damage", Some("2m"), Some("20s"))
            .with_tier("+15% party damage", Some("2m"), Some("25s"))
            .with_tier("+20% party damage and fear immunity", Some("1.5m"), Some("30s")),
        AbilityDef::new("holy_smite", "Holy Smite")
            .with_description("Call down judgement on a single foe.")
            .with_tier("Radiant damage equal to 3x CHA", Some("20s"), Some("Instant"))
            .with_tier("Radiant damage equal to 4x CHA", Some("18s"), Some("Instant"))
            .with_tier("Radiant damage equal to 5x CHA, blinds undead", Some("15s"), Some("Instant")),
        AbilityDef::new("blood_rage", "Blood Rage")
            .with_description("Pain becomes power.")
            .with_tier("+1% damage per 2% missing HP", Some("90s"), Some("15s"))
            .with_tier("+1% damage per 1% missing HP", Some("80s"), Some("20s"))
            .with_tier("As above, and lifesteal 5%", Some("70s"), Some("25s")),
        AbilityDef::new("fireball", "Fireball")
            .with_description("The first spell every mage learns and the last they forget.")
            .with_tier("Deal 2x INT fire damage", Some("8s"), Some("Instant"))
            .with_tier("Deal 3x INT fire damage", Some("7.5s"), Some("Instant"))
            .with_tier("Deal 4x INT fire damage, small splash", Some("7s"), Some("Instant"))
            .with_tier("Deal 5x INT fire damage, splash", Some("6.5s"), Some("Instant"))
            .with_tier("Deal 6x INT fire damage, burning ground", Some("6s"), Some("3s"))
            .evolves_to("meteor"),
        AbilityDef::new("meteor", "Meteor")
            .with_description("Fireball, but from orbit.")
            .with_tier("Deal 10x INT fire damage in a wide area", Some("60s"), Some("Instant"))
            .with_tier("Deal 14x INT fire damage in a wide area", Some("55s"), Some("Instant"))
            .with_tier("Deal 18x INT fire damage, leaves a crater", Some("50s"), Some("5s")),
        AbilityDef::new("mana_shield", "Mana Shield")
            .with_description("Spend mana instead of blood.")
            .with_tier("Absorb damage at 2 mana per HP", None, Some("Toggle"))
            .with_tier("Absorb damage at 1.5 mana per HP", None, Some("Toggle"))
            .with_tier("Absorb damage at 1 mana per HP", None, Some("Toggle")),
        AbilityDef::new("frost_nova", "Frost Nova")
            .with_description("Freeze everything within arm's reach.")
            .with_tier("Root nearby enemies", Some("25s"), Some("2s"))
            .with_tier("Root nearby enemies", Some("22s"), Some("3s"))
            .with_tier("Root and chill nearby enemies", Some("20s"), Some("4s")),
        AbilityDef::new("time_stop", "Time Stop")
            .with_description("Everything but you holds still.")
            .with_tier("Freeze time for everyone else", Some("10m"), Some("0.5s"))
            .with_tier("Freeze time for everyone else", Some("9m"), Some("1s"))
            .with_tier("Freeze time for everyone else", Some("8m"), Some("1.5s")),
        AbilityDef::new("quick_shot", "Quick Shot")
            .with_description("Loose an arrow before the enemy blinks.")
            .with_tier("Fast shot for 80% damage", Some("4s"), Some("Instant"))
            .with_tier("Fast shot for 100% damage", Some("3.5s"), Some("Instant"))
            .with_tier("Fast shot for 120% damage", Some("3s"), Some("Instant"))
            .evolves_to("volley"),
        AbilityDef::new("camouflage", "Camouflage")
            .with_description("Blend into the scenery.")
            .with_tier("Become hard to spot while still", Some("60s"), Some("30s"))
            .with_tier("Become hard to spot while walking", Some("50s"), Some("45s"))
            .with_tier("Become hard to spot while running", Some("40s"), Some("60s")),
        AbilityDef::new("volley", "Volley")
            .with_description("Fill the sky with arrows.")
            .with_tier("5 arrows in a cone", Some("30s"), Some("Instant"))
            .with_tier("8 arrows in a cone", Some("28s"), Some("Instant"))
            .with_tier("12 arrows in a cone", Some("25s"), Some("Instant")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_class_has_starting_item() {
        for class in builtin_classes() {
            assert!(!class.starting_item.is_empty(), "{} has no item", class.name);
            assert!(!class.abilities.is_empty(), "{} has no abilities", class.name);
        }
    }

    #[test]
    fn test_root_classes() {
        let registry = builtin_registry().unwrap();
        let roots: Vec<_> = registry
            .classes()
            .filter(|c| registry.parent_of(&c.name).is_none())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(roots, vec!["Fighter", "Mage", "Scout"]);
    }

    #[test]
    fn test_every_lineage_terminates() {
        let registry = builtin_registry().unwrap();
        for class in registry.classes() {
            assert!(registry.lineage(&class.name).is_ok(), "{}", class.name);
        }
    }
}
