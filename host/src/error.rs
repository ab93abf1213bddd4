//! Unified error handling for the host.

use crate::config::ConfigError;

/// Host error type.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] todo_engine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
