//! docknetctl settings
//!
//! Built-in defaults, overridden by a TOML file, overridden by `DOCKNET_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docknet_core::{DriverNames, DEFAULT_DRIVER_NAME};
use docknet_docker::{DEFAULT_DOCKER_URL, DEFAULT_REQUEST_TIMEOUT};
use docknet_state::{DEFAULT_POLL_INTERVAL, DEFAULT_STATE_DIR};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings files tried when none is given on the command line
pub const DEFAULT_SETTINGS_PATHS: &[&str] = &["/etc/docknet/docknet.toml", "./docknet.toml"];

/// Environment variable prefix (`DOCKNET_DOCKER_URL`, ...)
pub const ENV_PREFIX: &str = "DOCKNET";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Settings file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Docker daemon endpoint
    pub docker_url: String,
    /// Directory holding the oper state; empty keeps state in memory only
    pub state_dir: String,
    pub network_driver: String,
    pub ipam_driver: String,
    pub request_timeout_secs: u64,
    pub watch_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker_url: DEFAULT_DOCKER_URL.to_string(),
            state_dir: DEFAULT_STATE_DIR.to_string(),
            network_driver: DEFAULT_DRIVER_NAME.to_string(),
            ipam_driver: DEFAULT_DRIVER_NAME.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            watch_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the first default location that
    /// exists when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) if !path.exists() => {
                return Err(SettingsError::MissingFile(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => DEFAULT_SETTINGS_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists()),
        };

        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Settings::default())?);
        if let Some(file) = &file {
            log::debug!("Loading settings from {}", file.display());
            builder = builder.add_source(config::File::from(file.as_path()));
        }

        let settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.network_driver.is_empty() {
            return Err(invalid("network_driver", "driver name cannot be empty"));
        }
        if self.ipam_driver.is_empty() {
            return Err(invalid("ipam_driver", "driver name cannot be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.watch_interval_ms == 0 {
            return Err(invalid("watch_interval_ms", "must be at least 1"));
        }
        Ok(())
    }

    pub fn drivers(&self) -> DriverNames {
        DriverNames {
            network: self.network_driver.clone(),
            ipam: self.ipam_driver.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

fn invalid(field: &str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
