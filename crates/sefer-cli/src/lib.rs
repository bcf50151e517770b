//! Command-line browser for the Sefer place catalog
//!
//! ```text
//! sefer --places places.json zones Tigray
//! sefer --places places.json resolve --region Tigray --zone Mekelle
//! sefer --places places.json --json search mek
//! ```

pub mod commands;
pub mod config;

pub use config::{Cli, Command, SelectionArgs};

use sefer_places::PlaceDirectory;

/// Load the place table named by `cli` and run its command
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    let directory = PlaceDirectory::load(cli.catalog_config()?)?;
    commands::run(&cli.command, &directory, cli.json)
}
