//! DV01 command implementation.
//!
//! Prints the results persisted by an earlier run.

use anyhow::Result;
use clap::Args;

use propcash_engine::EngineConfig;

use crate::cli::OutputFormat;
use crate::commands::open_pipeline;
use crate::output::print_dv01;

/// Arguments for the dv01 command.
#[derive(Args, Debug)]
pub struct Dv01Args {
    /// As-at date (YYYY-MM-DD)
    pub as_at: String,
}

/// Executes the dv01 command.
pub async fn execute(args: Dv01Args, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let results = pipeline.dv01_for(&args.as_at).await?;
    print_dv01(&results, format)
}
