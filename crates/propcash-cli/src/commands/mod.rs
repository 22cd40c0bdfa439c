//! CLI command implementations.

pub mod dv01;
pub mod run;
pub mod versions;

pub use dv01::Dv01Args;
pub use run::RunArgs;
pub use versions::VersionsArgs;

use std::path::Path;

use propcash_core::types::LogicalTable;
use propcash_engine::{open_store, EngineConfig, Pipeline};
use tracing::info;

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Configuration file picked up from the working directory when no path is
/// given.
const DEFAULT_CONFIG: &str = "propcash.toml";

/// Loads the configuration named on the command line, falling back to
/// `propcash.toml` and then to defaults.
pub fn load_config(cli: &Cli) -> CliResult<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            EngineConfig::from_file(path).map_err(|e| CliError::Config(e.to_string()))?
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!(path = DEFAULT_CONFIG, "loading configuration");
            EngineConfig::from_file(DEFAULT_CONFIG).map_err(|e| CliError::Config(e.to_string()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(storage) = &cli.storage {
        config.storage_path.clone_from(storage);
    }
    Ok(config)
}

/// Opens the configured store and builds a pipeline over it.
pub fn open_pipeline(config: &EngineConfig) -> anyhow::Result<Pipeline> {
    let store = open_store(config)?;
    Ok(Pipeline::new(store, config.clone())?)
}

/// Parses a logical table name (case-insensitive).
pub fn parse_table(name: &str) -> CliResult<LogicalTable> {
    name.parse().map_err(|_| CliError::UnknownTable {
        name: name.to_string(),
        expected: LogicalTable::ALL
            .iter()
            .map(LogicalTable::name)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        assert_eq!(
            parse_table("dv01resultseries").unwrap(),
            LogicalTable::Dv01ResultSeries
        );
        let err = parse_table("Ledger").unwrap_err();
        assert!(err.to_string().contains("AdjustedCashflowLedger"));
    }
}
