//! Error types for storage operations.

use thiserror::Error;

/// Common error type for storage operations.
#[derive(Debug, Error)]
pub enum TraitError {
    /// Connection to the store failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Requested resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Store is locked by another writer
    #[error("store busy: {0}")]
    Busy(String),

    /// Operation timed out
    #[error("timeout")]
    Timeout,

    /// Parse/deserialization error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Database error
    #[error("database error: {0}")]
    DatabaseError(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl TraitError {
    /// Whether retrying the operation may succeed.
    ///
    /// Timeouts, connection and I/O failures and a busy store are transient.
    /// Everything else is a data or programming error and fails fast.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TraitError::ConnectionFailed(_)
                | TraitError::Busy(_)
                | TraitError::Timeout
                | TraitError::IoError(_)
        )
    }
}

impl From<std::io::Error> for TraitError {
    fn from(e: std::io::Error) -> Self {
        TraitError::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for TraitError {
    fn from(e: serde_json::Error) -> Self {
        TraitError::ParseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TraitError::Timeout.is_transient());
        assert!(TraitError::Busy("locked".into()).is_transient());
        assert!(TraitError::ConnectionFailed("refused".into()).is_transient());
        assert!(TraitError::from(std::io::Error::other("disk")).is_transient());
        assert!(!TraitError::ParseError("bad".into()).is_transient());
        assert!(!TraitError::InvalidInput("bad".into()).is_transient());
        assert!(!TraitError::DatabaseError("corrupt".into()).is_transient());
    }
}
