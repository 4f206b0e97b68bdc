//! Operational state of docknets created in the container runtime

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{DocknetError, StateError};
use crate::state::{self, StateDriver, WatchEvent};
use crate::Result;

/// Namespace of all docknet oper records in the state store
pub const DOCKNET_OPER_PREFIX: &str = "/contiv.io/oper/docknet/";

/// Composite record key `tenant.network.service`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperKey(String);

impl OperKey {
    pub fn new(tenant: &str, network: &str, service: &str) -> Self {
        Self(format!("{}.{}.{}", tenant, network, service))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full state store path of the record
    pub fn path(&self) -> String {
        oper_path(&self.0)
    }
}

impl fmt::Display for OperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn oper_path(id: &str) -> String {
    format!("{}{}", DOCKNET_OPER_PREFIX, id)
}

/// Binding of a tenant network to the runtime network created for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocknetOperState {
    pub id: String,
    #[serde(rename = "tenantName")]
    pub tenant_name: String,
    #[serde(rename = "networkName")]
    pub network_name: String,
    #[serde(rename = "serviceName")]
    pub service_name: String,
    #[serde(rename = "docknetUUID")]
    pub docknet_uuid: String,
}

impl DocknetOperState {
    pub fn new(tenant: &str, network: &str, service: &str, docknet_uuid: &str) -> Self {
        Self {
            id: OperKey::new(tenant, network, service).to_string(),
            tenant_name: tenant.to_string(),
            network_name: network.to_string(),
            service_name: service.to_string(),
            docknet_uuid: docknet_uuid.to_string(),
        }
    }

    /// Write the state, replacing any record with the same id
    pub async fn write(&self, driver: &dyn StateDriver) -> Result<()> {
        state::write_state(driver, &oper_path(&self.id), self).await?;
        Ok(())
    }

    /// Read the state for a given identifier
    pub async fn read(driver: &dyn StateDriver, id: &str) -> Result<Self> {
        match state::read_state(driver, &oper_path(id)).await {
            Ok(oper) => Ok(oper),
            Err(StateError::NotFound { .. }) => Err(DocknetError::NotFound { key: id.to_string() }),
            Err(err) => Err(err.into()),
        }
    }

    /// Read every docknet oper record
    pub async fn read_all(driver: &dyn StateDriver) -> Result<Vec<Self>> {
        Ok(state::read_all_state(driver, DOCKNET_OPER_PREFIX).await?)
    }

    /// Stream state transitions of all docknet records into `events` until
    /// the store ends the watch or the receiver goes away.
    pub async fn watch_all(
        driver: &dyn StateDriver,
        events: mpsc::Sender<WatchEvent<Self>>,
    ) -> Result<()> {
        state::watch_all_state(driver, DOCKNET_OPER_PREFIX, events).await?;
        Ok(())
    }

    /// Clear removes the state
    pub async fn clear(&self, driver: &dyn StateDriver) -> Result<()> {
        Self::clear_id(driver, &self.id).await
    }

    pub async fn clear_id(driver: &dyn StateDriver, id: &str) -> Result<()> {
        driver.clear(&oper_path(id)).await?;
        Ok(())
    }
}
