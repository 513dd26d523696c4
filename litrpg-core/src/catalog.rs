//! Monster and loot catalog used by the battle calculator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How dangerous a monster is relative to others of its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Trash,
    Regular,
    Champion,
    Boss,
}

impl Rank {
    pub fn name(&self) -> &'static str {
        match self {
            Rank::Trash => "Trash",
            Rank::Regular => "Regular",
            Rank::Champion => "Champion",
            Rank::Boss => "Boss",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Combat numbers shown on a monster card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterStats {
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// A monster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub rank: Rank,
    pub xp_reward: u64,
    pub credits: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stats: MonsterStats,
    #[serde(default)]
    pub abilities: Vec<String>,
}

impl Monster {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u32,
        rank: Rank,
        xp_reward: u64,
        credits: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            rank,
            xp_reward,
            credits,
            description: String::new(),
            stats: MonsterStats::default(),
            abilities: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_stats(mut self, health: u32, attack: u32, defense: u32, speed: u32) -> Self {
        self.stats = MonsterStats {
            health,
            attack,
            defense,
            speed,
        };
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
}

/// An item that can drop as loot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl LootItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Monsters and loot by id.
///
/// Later entries with the same id replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    monsters: BTreeMap<String, Monster>,
    items: BTreeMap<String, LootItem>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monster(mut self, monster: Monster) -> Self {
        self.monsters.insert(monster.id.clone(), monster);
        self
    }

    pub fn with_item(mut self, item: LootItem) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    /// Add or replace monsters, such as those carried in a save file.
    pub fn with_monsters(mut self, monsters: impl IntoIterator<Item = Monster>) -> Self {
        for monster in monsters {
            self.monsters.insert(monster.id.clone(), monster);
        }
        self
    }

    pub fn monster(&self, id: &str) -> Option<&Monster> {
        self.monsters.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&LootItem> {
        self.items.get(id)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &LootItem> {
        self.items.values()
    }

    /// The stock bestiary and loot table.
    pub fn builtin() -> Self {
        Self::new()
            .with_monster(
                Monster::new("rat", "Dungeon Rat", 1, Rank::Trash, 10, 1)
                    .with_description("Fat, bold, and everywhere.")
                    .with_stats(8, 2, 0, 6)
                    .with_abilities(["Gnaw"]),
            )
            .with_monster(
                Monster::new("goblin", "Goblin", 3, Rank::Regular, 40, 8)
                    .with_description("Small, green and unreasonably confident.")
                    .with_stats(25, 6, 2, 5)
                    .with_abilities(["Stab", "Flee"]),
            )
            .with_monster(
                Monster::new("wolf", "Grey Wolf", 5, Rank::Regular, 60, 0)
                    .with_description("Hunts in packs of three or more.")
                    .with_stats(40, 9, 3, 9)
                    .with_abilities(["Bite", "Howl"]),
            )
            .with_monster(
                Monster::new("orc_captain", "Orc Captain", 12, Rank::Champion, 400, 120)
                    .with_description("Commands a warband through volume alone.")
                    .with_stats(220, 24, 12, 4)
                    .with_abilities(["Cleave", "War Cry"]),
            )
            .with_monster(
                Monster::new("lich", "Lich of the Sunken Vault", 25, Rank::Boss, 5000, 2500)
                    .with_description("Has been waiting a very long time.")
                    .with_stats(1800, 60, 35, 6)
                    .with_abilities(["Soul Drain", "Bone Storm", "Phylactery"]),
            )
            .with_item(LootItem::new("potion", "Health Potion").with_description("Restores 50 HP."))
            .with_item(LootItem::new("mana_potion", "Mana Potion").with_description("Restores 50 MP."))
            .with_item(LootItem::new("wolf_pelt", "Wolf Pelt").with_description("Sells well in winter."))
            .with_item(LootItem::new("goblin_ear", "Goblin Ear").with_description("Bounty proof."))
            .with_item(LootItem::new("ability_disk", "Ability Disk").with_description("Installs one ability."))
            .with_item(LootItem::new("phylactery_shard", "Phylactery Shard").with_description("Still humming."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::builtin();
        let goblin = catalog.monster("goblin").unwrap();
        assert_eq!(goblin.name, "Goblin");
        assert_eq!(goblin.rank, Rank::Regular);
        assert_eq!(catalog.item("potion").unwrap().name, "Health Potion");
        assert!(catalog.monster("dragon").is_none());
    }

    #[test]
    fn test_with_monsters_replaces_by_id() {
        let catalog = Catalog::builtin().with_monsters(vec![Monster::new(
            "goblin",
            "Goblin Chief",
            8,
            Rank::Champion,
            150,
            40,
        )]);
        assert_eq!(catalog.monster("goblin").unwrap().name, "Goblin Chief");
        assert!(catalog.monster("rat").is_some());
    }

    #[test]
    fn test_monster_deserialize_defaults() {
        let monster: Monster = serde_json::from_str(
            r#"{"id":"slime","name":"Slime","level":2,"rank":"Trash","xp_reward":5,"credits":1}"#,
        )
        .unwrap();
        assert_eq!(monster.stats, MonsterStats::default());
        assert!(monster.abilities.is_empty());
    }
}
