//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap. Execution lives in `commands`.

use clap::{Parser, Subcommand};
use litrpg_core::{Attribute, Selection};
use std::path::PathBuf;

/// Headless LitRPG character sheet
#[derive(Parser)]
#[command(name = "litrpg")]
#[command(about = "Track a LitRPG character: XP, levels, points, abilities and loot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML file overriding the progression rules
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a character and save it
    New {
        #[arg(long)]
        name: String,

        /// Starting class (see `classes`)
        #[arg(long)]
        class: String,

        /// Starting abilities, repeat to take more levels
        #[arg(long = "ability")]
        abilities: Vec<String>,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print the character sheet
    Show { save: PathBuf },

    /// Apply a battle reward
    Battle {
        save: PathBuf,

        /// Defeated monsters as `id:qty`
        #[arg(long = "monster", required = true)]
        monsters: Vec<Selection>,

        #[command(flatten)]
        common: RewardArgs,
    },

    /// Apply a custom XP and credit reward
    Reward {
        save: PathBuf,

        #[arg(long, default_value_t = 0)]
        xp: u64,

        #[arg(long, default_value_t = 0)]
        credits: u64,

        #[arg(long, default_value = "")]
        description: String,

        #[command(flatten)]
        common: RewardArgs,
    },

    /// Spend attribute and ability points
    Spend {
        save: PathBuf,

        /// Attributes to raise by one, e.g. `--attr STR --attr MEM`
        #[arg(long = "attr")]
        attributes: Vec<Attribute>,

        /// Abilities to raise by one level
        #[arg(long = "ability")]
        abilities: Vec<String>,
    },

    /// Learn an ability from an ability disk
    Install { save: PathBuf, ability: String },

    /// Evolve into an upgrade of the current class
    Evolve { save: PathBuf, class: String },

    /// List classes with their lineages
    Classes,

    /// List monsters and loot
    Monsters,
}

/// Options shared by reward commands.
#[derive(clap::Args)]
pub struct RewardArgs {
    /// Loot as `id:qty`
    #[arg(long = "loot")]
    pub loot: Vec<Selection>,

    /// Party members sharing the reward
    #[arg(long, default_value_t = 1)]
    pub party: u32,

    /// Chapter tag for the history log
    #[arg(long)]
    pub chapter: Option<String>,
}
