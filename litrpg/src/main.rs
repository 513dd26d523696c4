//! Headless LitRPG character sheet.
//!
//! A command-line front end for creating characters, applying battle and
//! custom rewards, and spending points.
//!
//! ```bash
//! cargo run -p litrpg -- new --name "Zorian" --class Mage --ability fireball
//! cargo run -p litrpg -- battle Zorian.json --monster goblin:3 --loot goblin_ear:3 --chapter "Ch. 1"
//! cargo run -p litrpg -- show Zorian.json
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

mod cli;
mod commands;
mod display;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use commands::Tables;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tables = Tables::load(cli.rules.as_deref())?;
    commands::run(cli.command, &tables)
}
