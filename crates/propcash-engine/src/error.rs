//! Engine error types.

use propcash_core::types::Date;
use propcash_core::CoreError;
use propcash_ledger::LedgerError;
use propcash_traits::TraitError;
use thiserror::Error;

/// A specialized Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The run date is not a strict `YYYY-MM-DD` date.
    #[error("malformed as-at date '{input}': {reason}")]
    MalformedAsAtDate {
        /// Text supplied by the caller.
        input: String,
        /// Parser message.
        reason: String,
    },

    /// No ledger version precedes the run date.
    #[error("no ledger version before {as_at}")]
    MissingLedgerVersion {
        /// Run date.
        as_at: Date,
    },

    /// Reference data required by the run is absent.
    #[error("missing reference data: {0}")]
    MissingReferenceData(String),

    /// A stored row failed schema normalisation.
    #[error("schema error: {0}")]
    Schema(#[from] CoreError),

    /// A normalised row could not be decoded into its record type.
    #[error("cannot decode {table} row: {reason}")]
    Decode {
        /// Logical table name.
        table: String,
        /// Decoder message.
        reason: String,
    },

    /// A row was handed to the writer under the wrong version key.
    #[error("{table} row belongs to version {found}, not {expected}")]
    VersionMismatch {
        /// Logical table name.
        table: String,
        /// Partition being written.
        expected: String,
        /// Partition of the offending row.
        found: String,
    },

    /// Storage error
    #[error("storage error: {0}")]
    Storage(#[from] TraitError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Creates a malformed as-at date error.
    #[must_use]
    pub fn malformed_as_at(input: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedAsAtDate {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the failure came from a transient storage condition.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Storage(e) if e.is_transient())
    }
}

impl From<LedgerError> for EngineError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::MissingLedgerVersion { as_at } => {
                EngineError::MissingLedgerVersion { as_at }
            }
            LedgerError::MissingReferenceData { what } => EngineError::MissingReferenceData(what),
        }
    }
}
