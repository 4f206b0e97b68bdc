//! Docker client error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockerError {
    /// Daemon answered with a non-success status
    #[error("Docker API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unsupported docker endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Docker request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
}

impl DockerError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DockerError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
