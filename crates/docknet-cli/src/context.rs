use std::sync::Arc;

use anyhow::{Context, Result};
use docknet_core::{DocknetManager, MemoryStateDriver, StateDriver};
use docknet_docker::DockerClient;
use docknet_state::FileStateDriver;
use log::{info, warn};

use crate::settings::Settings;

#[derive(Clone)]
pub struct AppContext {
    pub manager: Arc<DocknetManager>,
}

impl AppContext {
    pub fn bootstrap(settings: Settings) -> Result<Arc<Self>> {
        let runtime = DockerClient::new(&settings.docker_url, settings.request_timeout())
            .with_context(|| format!("Failed to set up docker client for {}", settings.docker_url))?;

        let state: Arc<dyn StateDriver> = if settings.state_dir.is_empty() {
            warn!("No state_dir configured, docknet oper state is kept in memory only");
            Arc::new(MemoryStateDriver::new())
        } else {
            info!("Using docknet state directory {}", settings.state_dir);
            Arc::new(
                FileStateDriver::with_base_path(&settings.state_dir)
                    .with_poll_interval(settings.watch_interval()),
            )
        };

        let manager = DocknetManager::new(Arc::new(runtime), state, settings.drivers());

        Ok(Arc::new(Self {
            manager: Arc::new(manager),
        }))
    }
}
