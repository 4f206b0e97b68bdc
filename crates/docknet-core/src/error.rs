//! Error types for docknet operations

use thiserror::Error;

/// Main error type for docknet operations
#[derive(Debug, Error)]
pub enum DocknetError {
    #[error("Invalid docknet name format: '{name}'")]
    InvalidFormat { name: String },

    #[error("Network name {name} used by another driver {driver}")]
    NameCollision { name: String, driver: String },

    #[error("Docknet oper state not found: {key}")]
    NotFound { key: String },

    #[error("Docknet UUID not found: {uuid}")]
    UuidNotFound { uuid: String },

    #[error("Invalid network configuration for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Failure reported by the container runtime, passed through as-is
    #[error(transparent)]
    Runtime(anyhow::Error),

    #[error("State store error: {0}")]
    State(#[from] StateError),
}

impl DocknetError {
    /// True for the "no such record" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocknetError::NotFound { .. }
                | DocknetError::UuidNotFound { .. }
                | DocknetError::State(StateError::NotFound { .. })
        )
    }
}

/// State store errors
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("State backend error: {message}")]
    Backend { message: String },
}
