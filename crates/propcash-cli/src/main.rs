//! Propcash CLI - contracted cashflow consolidation and DV01.
//!
//! # Usage
//!
//! ```bash
//! # Run the pipeline for an as-at date
//! propcash run 2025-06-30
//!
//! # List stored versions of a table
//! propcash versions AdjustedCashflowLedger
//!
//! # Show persisted DV01 results
//! propcash dv01 2025-06-30 --format json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info,propcash=debug" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(&cli)?;
    let format = cli.format;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, format).await?,
        Commands::Versions(args) => commands::versions::execute(args, &config, format).await?,
        Commands::Dv01(args) => commands::dv01::execute(args, &config, format).await?,
    }

    Ok(())
}
