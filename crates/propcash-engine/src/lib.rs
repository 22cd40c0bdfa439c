//! # Propcash Engine
//!
//! Orchestration for the Propcash pipeline.
//!
//! This crate provides:
//! - [`Pipeline`]: one as-at run from raw ledgers to persisted DV01
//! - [`Repository`]: typed store access with deadlines, retry and schema
//!   normalisation
//! - [`VersionedWriter`]: replace-or-append writes keyed by version
//! - [`EngineConfig`]: TOML configuration
//!
//! ## Usage
//!
//! ```ignore
//! let config = EngineConfig::from_file("propcash.toml")?;
//! let pipeline = Pipeline::new(open_store(&config)?, config)?;
//! let report = pipeline.run("2025-06-30").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod error;
pub mod lock;
pub mod pipeline;
pub mod repository;
pub mod runtime;
pub mod writer;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use lock::{RunGuard, RunLock};
pub use pipeline::{Pipeline, RunReport};
pub use repository::Repository;
pub use runtime::RetryConfig;
pub use writer::{dedup_rows, UpsertOutcome, VersionedWriter};

use std::path::Path;
use std::sync::Arc;

use propcash_ext_redb::RedbTableStore;
use propcash_traits::TableStore;

/// Opens the file-backed store named by `config.storage_path`, creating its
/// directory if needed.
///
/// # Errors
///
/// Returns `EngineError::Storage` if the directory or database cannot be
/// opened.
pub fn open_store(config: &EngineConfig) -> EngineResult<Arc<dyn TableStore>> {
    let path = Path::new(&config.storage_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(propcash_traits::TraitError::from)?;
    }
    let store = RedbTableStore::open(path)?;
    tracing::info!(path = %path.display(), "opened store");
    Ok(Arc::new(store))
}
