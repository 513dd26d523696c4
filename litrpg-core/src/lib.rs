//! LitRPG character progression engine.
//!
//! This crate provides:
//! - Experience curve, level rewards and point budgets
//! - Stat-scaled ability cooldowns and durations
//! - Class and ability registry with upgrade lineages
//! - Battle and custom reward calculation with atomic application
//! - Character persistence
//!
//! # Quick Start
//!
//! ```no_run
//! use litrpg_core::{
//!     Catalog, CharacterBuilder, ProgressionRules, Registry, RewardRequest, Selection, Session,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::builtin()?;
//!     let catalog = Catalog::builtin();
//!     let rules = ProgressionRules::default();
//!
//!     let character = CharacterBuilder::new()
//!         .name("Zorian")
//!         .class("Mage")
//!         .ability("fireball")
//!         .build(&registry, &rules)?;
//!
//!     let mut session = Session::new(character, &registry, &catalog, &rules);
//!     let id = session.queue_reward(RewardRequest::combat(vec![Selection::new("goblin", 2)]));
//!     let report = session.apply(id, Some("Ch. 1"))?;
//!     println!("Now level {}", report.new_level);
//!
//!     session.save("zorian.json")?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod character;
pub mod character_builder;
pub mod class_data;
pub mod modifiers;
pub mod persist;
pub mod progression;
pub mod registry;
pub mod rewards;
pub mod rules;
pub mod session;
pub mod sheet;

// Primary public API
pub use catalog::{Catalog, LootItem, Monster, Rank};
pub use character::{create_sample_character, Attribute, Attributes, Character};
pub use character_builder::{BuilderError, CharacterBuilder};
pub use persist::{PersistError, SaveDocument};
pub use progression::{LevelReward, LevelUpReport, PointBudget};
pub use registry::{AbilityDef, ClassDef, Evolution, Registry, RegistryError};
pub use rewards::{RewardRequest, RewardResult, Selection};
pub use rules::{ConfigError, ProgressionRules};
pub use session::{RewardId, Session, SessionError};
pub use sheet::{CharacterSheet, SheetError};
