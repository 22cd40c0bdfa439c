//! Error types for ledger stages.
//!
//! Only structural problems are errors. Row-level anomalies (unmapped
//! charges, zero denominators, unmapped properties) are absorbed into
//! sentinel values and reported through each stage's summary.

use propcash_core::types::Date;
use thiserror::Error;

/// A specialized Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error types for ledger stages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// No ledger version exists strictly before the as-at date.
    #[error("No ledger version before {as_at}")]
    MissingLedgerVersion {
        /// Requested as-at date.
        as_at: Date,
    },

    /// Reference data required by a stage is absent.
    #[error("Missing reference data: {what}")]
    MissingReferenceData {
        /// What is missing.
        what: String,
    },
}

impl LedgerError {
    /// Creates a missing reference data error.
    #[must_use]
    pub fn missing_reference_data(what: impl Into<String>) -> Self {
        Self::MissingReferenceData { what: what.into() }
    }
}
