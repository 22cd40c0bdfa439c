//! Engine configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use propcash_core::daycount::YearBasis;
use propcash_curves::RegionAliases;

use crate::error::{EngineError, EngineResult};
use crate::runtime::RetryConfig;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage path
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Deadline for each store call, in seconds
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,

    /// Retry policy for transient store failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Days per year for time-to-cashflow
    #[serde(default)]
    pub year_basis: YearBasis,

    /// Parallel curve shock in basis points
    #[serde(default = "default_shock_bps")]
    pub dv01_shock_bps: f64,

    /// Valuation region to curve bucket aliases
    #[serde(default)]
    pub region_aliases: RegionAliases,

    /// Coarse benchmark instrument per curve bucket
    #[serde(default = "default_benchmark_identifiers")]
    pub benchmark_identifiers: BTreeMap<String, String>,
}

fn default_storage_path() -> String {
    "./data/propcash.redb".to_string()
}

fn default_io_timeout_secs() -> u64 {
    30
}

fn default_shock_bps() -> f64 {
    1.0
}

fn default_benchmark_identifiers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("AUD".to_string(), "ADSWAP10 Curncy".to_string()),
        ("JPY".to_string(), "JYSO10 BGN Curncy".to_string()),
    ])
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            io_timeout_secs: default_io_timeout_secs(),
            retry: RetryConfig::default(),
            year_basis: YearBasis::default(),
            dv01_shock_bps: default_shock_bps(),
            region_aliases: RegionAliases::default(),
            benchmark_identifiers: default_benchmark_identifiers(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the file cannot be read, is not
    /// valid TOML, or fails [`EngineConfig::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` on invalid TOML or values.
    pub fn from_toml(content: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| EngineError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` naming the first invalid setting.
    pub fn validate(&self) -> EngineResult<()> {
        YearBasis::new(self.year_basis.days_per_year())
            .map_err(|e| EngineError::config(format!("year_basis: {e}")))?;
        if self.io_timeout_secs == 0 {
            return Err(EngineError::config("io_timeout_secs must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(EngineError::config("retry.max_attempts must be at least 1"));
        }
        if !(self.retry.backoff_multiplier.is_finite() && self.retry.backoff_multiplier >= 1.0) {
            return Err(EngineError::config("retry.backoff_multiplier must be >= 1"));
        }
        if !(self.dv01_shock_bps.is_finite() && self.dv01_shock_bps > 0.0) {
            return Err(EngineError::config("dv01_shock_bps must be positive"));
        }
        Ok(())
    }

    /// Store call deadline.
    #[must_use]
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}
