//! Error types for the quad store.
//!
//! This module provides a unified `Error` type for all store operations.

use thiserror::Error;

/// A specialized `Result` type for quad store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while constructing or using a store.
///
/// Construction-time failures (`Configuration`, `Unreachable`, `Schema`) are
/// fatal: no store value exists when they are raised. `Operation` is the
/// single per-call failure channel; it carries the underlying relational
/// engine's message and is always raised after the transaction in flight has
/// been rolled back.
#[derive(Debug, Error)]
pub enum Error {
    /// The connection target was empty or otherwise invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The relational engine could not be opened, or the schema probe
    /// itself failed.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Creating the backing relation or its indexes failed.
    #[error("schema error: {0}")]
    Schema(String),

    /// A mutation or read failed after the store was constructed.
    #[error("operation failed: {0}")]
    Operation(String),

    /// A term violated the canonical-form contract (control characters,
    /// or longer than [`MAX_TERM_LEN`](crate::term::MAX_TERM_LEN) code units).
    #[error("invalid term: {0}")]
    InvalidTerm(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Operation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Unreachable("no such file".to_string());
        assert!(err.to_string().contains("unreachable"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_error_from_rusqlite() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Operation(_)));
    }
}
