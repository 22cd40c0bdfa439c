//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{Dv01Args, RunArgs, VersionsArgs};

/// Propcash - contracted property cashflows and rate sensitivity
#[derive(Parser)]
#[command(name = "propcash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "PROPCASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Store path, overriding the configuration
    #[arg(short, long, env = "PROPCASH_STORAGE", global = true)]
    pub storage: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline for an as-at date and print DV01 per property
    Run(RunArgs),

    /// List the stored versions of a logical table
    Versions(VersionsArgs),

    /// Print persisted DV01 results for an as-at date
    Dv01(Dv01Args),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
