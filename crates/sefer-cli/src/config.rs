use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sefer_places::CatalogConfig;

#[derive(Debug, Parser)]
#[command(name = "sefer", about = "Browse the Ethiopian administrative place catalog")]
pub struct Cli {
    /// Place table (JSON array of rows keyed "Level 1".."Level 5")
    #[arg(long, env = "SEFER_PLACES", global = true)]
    pub places: Option<PathBuf>,

    /// Literal that marks an absent level in the place table
    #[arg(long, global = true)]
    pub sentinel: Option<String>,

    /// Label of the country root
    #[arg(long, global = true)]
    pub root_label: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Catalog configuration from the global flags
    pub fn catalog_config(&self) -> anyhow::Result<CatalogConfig> {
        let Some(places) = &self.places else {
            anyhow::bail!("no place table given: pass --places or set SEFER_PLACES");
        };
        let mut config = CatalogConfig::with_source(places);
        if let Some(sentinel) = &self.sentinel {
            config = config.with_sentinel(sentinel);
        }
        if let Some(label) = &self.root_label {
            config = config.with_root_label(label);
        }
        if let Command::Search { limit: Some(limit), .. } = &self.command {
            config = config.with_search_limit(*limit);
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all regions
    Regions,
    /// List the zones of a region
    Zones { region: String },
    /// List the woredas of a zone
    Woredas { region: String, zone: String },
    /// List the kebeles of a woreda
    Kebeles {
        region: String,
        zone: String,
        woreda: String,
    },
    /// Find places by name
    Search {
        query: String,
        /// Maximum number of hits
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Resolve a selection to its scope and query string
    Resolve(SelectionArgs),
    /// Decode a query string into a selection
    Parse {
        /// e.g. "region=Tigray&zone=Mekelle"
        query: String,
    },
    /// Catalog size and data-quality counts
    Stats,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub zone: Option<String>,
    #[arg(long)]
    pub woreda: Option<String>,
    #[arg(long)]
    pub kebele: Option<String>,
}
