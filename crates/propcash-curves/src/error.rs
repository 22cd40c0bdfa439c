//! Error types for curve operations.

use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// The instrument mnemonic carries no recognisable tenor.
    #[error("Cannot parse tenor from mnemonic '{mnemonic}'")]
    UnparseableTenor {
        /// The offending mnemonic.
        mnemonic: String,
    },

    /// Not enough data points to build a curve.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Tenors are not strictly increasing.
    #[error("Non-monotonic tenors at index {index}: {prev:.4} >= {current:.4}")]
    NonMonotonicTenors {
        /// Index where the violation occurred.
        index: usize,
        /// Previous tenor.
        prev: f64,
        /// Current tenor.
        current: f64,
    },

    /// A tenor or rate is not a finite number.
    #[error("Invalid curve point: {reason}")]
    InvalidPoint {
        /// What is wrong with the point.
        reason: String,
    },
}

impl CurveError {
    /// Creates an unparseable tenor error.
    #[must_use]
    pub fn unparseable_tenor(mnemonic: impl Into<String>) -> Self {
        Self::UnparseableTenor {
            mnemonic: mnemonic.into(),
        }
    }

    /// Creates an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, got: usize) -> Self {
        Self::InsufficientPoints { required, got }
    }

    /// Creates a non-monotonic tenors error.
    #[must_use]
    pub fn non_monotonic_tenors(index: usize, prev: f64, current: f64) -> Self {
        Self::NonMonotonicTenors {
            index,
            prev,
            current,
        }
    }

    /// Creates an invalid point error.
    #[must_use]
    pub fn invalid_point(reason: impl Into<String>) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }
}
