//! Command execution over `litrpg-core`.

use crate::cli::{Commands, RewardArgs};
use crate::display;
use anyhow::{bail, Context, Result};
use litrpg_core::persist::character_save_path;
use litrpg_core::{
    Catalog, CharacterBuilder, ProgressionRules, Registry, RewardRequest, Session,
};
use std::path::Path;
use tracing::info;

/// Shared tables for one invocation.
pub struct Tables {
    pub registry: Registry,
    pub catalog: Catalog,
    pub rules: ProgressionRules,
}

impl Tables {
    pub fn load(rules_path: Option<&Path>) -> Result<Self> {
        let rules = match rules_path {
            Some(path) => ProgressionRules::load(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?,
            None => ProgressionRules::default(),
        };
        Ok(Self {
            registry: Registry::builtin().context("Built-in class data is invalid")?,
            catalog: Catalog::builtin(),
            rules,
        })
    }

    fn open(&self, save: &Path) -> Result<Session<'_>> {
        Session::load(save, &self.registry, &self.catalog, &self.rules)
            .with_context(|| format!("Failed to load {}", save.display()))
    }
}

pub fn run(command: Commands, tables: &Tables) -> Result<()> {
    match command {
        Commands::New {
            name,
            class,
            abilities,
            dir,
        } => {
            let mut builder = CharacterBuilder::new().name(name).class(class);
            for ability in abilities {
                builder = builder.ability(ability);
            }
            let character = builder
                .build(&tables.registry, &tables.rules)
                .context("Failed to create character")?;

            let path = character_save_path(&dir, &character.name);
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            let session = Session::new(character, &tables.registry, &tables.catalog, &tables.rules);
            save(&session, &path)?;
            display::print_sheet(session.character(), &tables.registry, &tables.rules);
        }

        Commands::Show { save: path } => {
            let session = tables.open(&path)?;
            display::print_sheet(session.character(), &tables.registry, &tables.rules);
        }

        Commands::Battle {
            save: path,
            monsters,
            common,
        } => {
            let request = RewardRequest::combat(monsters);
            apply_reward(tables, &path, request, common)?;
        }

        Commands::Reward {
            save: path,
            xp,
            credits,
            description,
            common,
        } => {
            let request = RewardRequest::custom(xp, credits, description);
            apply_reward(tables, &path, request, common)?;
        }

        Commands::Spend {
            save: path,
            attributes,
            abilities,
        } => {
            let mut session = tables.open(&path)?;
            for attribute in attributes {
                if !session.sheet().increment_attribute(attribute) {
                    bail!("Cannot raise {attribute}: no attribute points left");
                }
            }
            for ability in abilities {
                if !session.sheet().level_up_ability(&ability) {
                    bail!("Cannot raise {ability}: not visible, at max level, or no points left");
                }
            }
            save(&session, &path)?;
            display::print_sheet(session.character(), &tables.registry, &tables.rules);
        }

        Commands::Install {
            save: path,
            ability,
        } => {
            let mut session = tables.open(&path)?;
            if !session.sheet().install_ability_disk(&ability) {
                bail!("Cannot install {ability}: unknown or already learned");
            }
            save(&session, &path)?;
            println!("[INSTALLED] {ability}");
        }

        Commands::Evolve { save: path, class } => {
            let mut session = tables.open(&path)?;
            session
                .change_class(&class)
                .with_context(|| format!("Failed to evolve into {class}"))?;
            save(&session, &path)?;
            display::print_sheet(session.character(), &tables.registry, &tables.rules);
        }

        Commands::Classes => display::print_classes(&tables.registry),

        Commands::Monsters => display::print_catalog(&tables.catalog),
    }
    Ok(())
}

fn apply_reward(tables: &Tables, path: &Path, request: RewardRequest, args: RewardArgs) -> Result<()> {
    let mut session = tables.open(path)?;
    let request = request.with_party_size(args.party).with_loot(args.loot);

    let id = session.queue_reward(request);
    let result = session
        .pending()
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.result.clone())
        .context("Queued reward disappeared")?;
    let report = session.apply(id, args.chapter.as_deref())?;

    save(&session, path)?;
    display::print_reward(&result, &report);
    Ok(())
}

fn save(session: &Session<'_>, path: &Path) -> Result<()> {
    session
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    info!(path = %path.display(), "Saved");
    Ok(())
}
