//! Docknet Docker
//!
//! Network runtime backed by the Docker Engine HTTP API.

pub mod client;
pub mod error;

pub use client::{DockerClient, DEFAULT_DOCKER_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::DockerError;
