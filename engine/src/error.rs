//! Error types for the todo engine.

use thiserror::Error;

/// Failures reported by a persistence backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("quota exceeded for key '{key}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        limit: usize,
        needed: usize,
    },

    #[error("io error: {0}")]
    Io(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// All possible errors from the todo engine.
///
/// Malformed persisted data and unknown item ids are not errors; only a
/// failure to write the collection through to the backend is surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("failed to persist '{key}': {source}")]
    Persist {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to encode collection: {0}")]
    Encode(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidSnapshot("expected value".into());
        assert_eq!(err.to_string(), "invalid snapshot: expected value");

        let err = Error::Persist {
            key: "todos".into(),
            source: BackendError::QuotaExceeded {
                key: "todos".into(),
                limit: 10,
                needed: 42,
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to persist 'todos': quota exceeded for key 'todos': 42 bytes needed, limit is 10"
        );

        let err = BackendError::Io("disk full".into());
        assert_eq!(err.to_string(), "io error: disk full");
    }

    #[test]
    fn persist_error_exposes_source() {
        use std::error::Error as _;

        let err = Error::Persist {
            key: "todos".into(),
            source: BackendError::Unavailable("closed".into()),
        };
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "backend unavailable: closed");
    }
}
