//! Error types for the Propcash core crate.
//!
//! Structural problems with input values (bad dates, unknown tables,
//! values that do not match their schema) are reported through
//! [`CoreError`].

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A calendar date could not be parsed or constructed.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A charge type string is not one of the canonical buckets.
    #[error("Unknown charge type: {value}")]
    UnknownChargeType {
        /// The unrecognised value.
        value: String,
    },

    /// A numeric parameter is outside its valid range.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// A logical table name is not registered.
    #[error("Unknown logical table: {name}")]
    UnknownTable {
        /// The unrecognised table name.
        name: String,
    },

    /// A field value could not be coerced to its semantic type.
    #[error("Schema violation in {table}.{field}: {reason}")]
    SchemaViolation {
        /// Logical table name.
        table: String,
        /// Field name.
        field: String,
        /// What went wrong.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an unknown charge type error.
    #[must_use]
    pub fn unknown_charge_type(value: impl Into<String>) -> Self {
        Self::UnknownChargeType {
            value: value.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a schema violation error.
    #[must_use]
    pub fn schema_violation(
        table: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaViolation {
            table: table.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date("Cannot parse: 2025/01/01");
        assert!(err.to_string().contains("2025/01/01"));

        let err =
            CoreError::schema_violation("PropertyNameMapping", "MriPropertyCode", "not a number");
        assert_eq!(
            err.to_string(),
            "Schema violation in PropertyNameMapping.MriPropertyCode: not a number"
        );
    }
}
