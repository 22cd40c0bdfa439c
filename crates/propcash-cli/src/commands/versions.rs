//! Versions command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use propcash_engine::EngineConfig;

use crate::cli::OutputFormat;
use crate::commands::{open_pipeline, parse_table};
use crate::output::print_output;

/// Arguments for the versions command.
#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Logical table name (e.g. AdjustedCashflowLedger)
    pub table: String,
}

#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    #[tabled(rename = "Table")]
    table: &'static str,
    #[tabled(rename = "Version")]
    version: String,
}

/// Executes the versions command.
pub async fn execute(
    args: VersionsArgs,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<()> {
    let table = parse_table(&args.table)?;
    let pipeline = open_pipeline(config)?;
    let rows: Vec<VersionRow> = pipeline
        .versions(table)
        .await?
        .into_iter()
        .map(|v| VersionRow {
            table: table.name(),
            version: v.to_string(),
        })
        .collect();
    print_output(&rows, format)
}
