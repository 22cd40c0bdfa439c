//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown logical table name.
    #[error("Unknown table: {name}. Expected one of: {expected}")]
    UnknownTable {
        /// Name given on the command line.
        name: String,
        /// Valid names.
        expected: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
