//! Binding of tenant networks to container runtime networks

use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info};
use tokio::sync::mpsc;

use crate::config::NetworkConfig;
use crate::error::DocknetError;
use crate::naming::encode_docknet_name;
use crate::oper::{DocknetOperState, OperKey};
use crate::runtime::{IpamConfig, IpamSpec, NetworkCreateRequest, NetworkRuntime};
use crate::state::{StateDriver, WatchEvent};
use crate::Result;

/// Driver name used for both the network and the IPAM driver by default
pub const DEFAULT_DRIVER_NAME: &str = "netplugin";

/// Runtime driver names the manager creates networks with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverNames {
    pub network: String,
    pub ipam: String,
}

impl Default for DriverNames {
    fn default() -> Self {
        Self {
            network: DEFAULT_DRIVER_NAME.to_string(),
            ipam: DEFAULT_DRIVER_NAME.to_string(),
        }
    }
}

/// Creates, removes and looks up docknets.
///
/// Every operation is a short sequence of one runtime call and at most one
/// state store call. Nothing is locked: two concurrent creates for the same
/// tenant network both reach the runtime, which rejects the duplicate.
pub struct DocknetManager {
    runtime: Arc<dyn NetworkRuntime>,
    state: Arc<dyn StateDriver>,
    drivers: DriverNames,
}

impl DocknetManager {
    pub fn new(
        runtime: Arc<dyn NetworkRuntime>,
        state: Arc<dyn StateDriver>,
        drivers: DriverNames,
    ) -> Self {
        Self {
            runtime,
            state,
            drivers,
        }
    }

    pub fn drivers(&self) -> &DriverNames {
        &self.drivers
    }

    /// Create the runtime network for a tenant network and record it.
    ///
    /// An existing runtime network of the same name and driver is reused.
    /// When the state write fails after the network was created the network
    /// stays in the runtime.
    pub async fn create_binding(
        &self,
        tenant: &str,
        network: &str,
        service: &str,
        config: &NetworkConfig,
    ) -> Result<DocknetOperState> {
        let docknet_name = encode_docknet_name(tenant, network, "", service);

        let existing = self
            .runtime
            .inspect_network(&docknet_name)
            .await
            .map_err(|err| {
                error!("Error inspecting network {}. Err: {}", docknet_name, err);
                DocknetError::Runtime(err)
            })?;

        let network_id = match existing {
            Some(handle) if handle.driver == self.drivers.network => {
                info!("docker network: {} already exists", docknet_name);
                handle.id
            }
            Some(handle) => {
                error!(
                    "Network name {} used by another driver {}",
                    docknet_name, handle.driver
                );
                return Err(DocknetError::NameCollision {
                    name: docknet_name,
                    driver: handle.driver,
                });
            }
            None => {
                config.validate()?;
                let request = self.create_request(&docknet_name, config);
                info!("Creating docker network: {:?}", request);

                let handle = self
                    .runtime
                    .create_network(&request)
                    .await
                    .map_err(|err| {
                        error!("Error creating network {}. Err: {}", docknet_name, err);
                        DocknetError::Runtime(err)
                    })?;
                handle.id
            }
        };

        let oper = DocknetOperState::new(tenant, network, service, &network_id);
        oper.write(self.state.as_ref()).await.map_err(|err| {
            error!(
                "Error saving docknet oper state {}. Network {} ({}) left in runtime. Err: {}",
                oper.id, docknet_name, network_id, err
            );
            err
        })?;

        Ok(oper)
    }

    /// Remove the runtime network of a tenant network and drop its record.
    ///
    /// The record is kept when the runtime refuses the removal.
    pub async fn delete_binding(&self, tenant: &str, network: &str, service: &str) -> Result<()> {
        let docknet_name = encode_docknet_name(tenant, network, "", service);

        info!("Deleting docker network: {}", docknet_name);

        self.runtime
            .remove_network(&docknet_name)
            .await
            .map_err(|err| {
                error!("Error deleting network {}. Err: {}", docknet_name, err);
                DocknetError::Runtime(err)
            })?;

        let key = OperKey::new(tenant, network, service);
        DocknetOperState::clear_id(self.state.as_ref(), key.as_str()).await
    }

    /// Find the binding whose runtime network id is `network_id`.
    ///
    /// Scans every record; the number of records is the number of live
    /// tenant networks.
    pub async fn find_binding_by_network_id(&self, network_id: &str) -> Result<DocknetOperState> {
        let bindings = self.list_bindings().await.map_err(|err| {
            error!("Error getting docknet list. Err: {}", err);
            err
        })?;

        bindings
            .into_iter()
            .find(|oper| oper.docknet_uuid == network_id)
            .ok_or_else(|| DocknetError::UuidNotFound {
                uuid: network_id.to_string(),
            })
    }

    /// Read the binding of one tenant network
    pub async fn get_binding(
        &self,
        tenant: &str,
        network: &str,
        service: &str,
    ) -> Result<DocknetOperState> {
        let key = OperKey::new(tenant, network, service);
        DocknetOperState::read(self.state.as_ref(), key.as_str()).await
    }

    /// Every recorded binding, in no particular order
    pub async fn list_bindings(&self) -> Result<Vec<DocknetOperState>> {
        DocknetOperState::read_all(self.state.as_ref()).await
    }

    /// Stream binding changes into `events` until the store ends the watch
    /// or the receiver is dropped. Blocks the calling task meanwhile.
    pub async fn watch_bindings(
        &self,
        events: mpsc::Sender<WatchEvent<DocknetOperState>>,
    ) -> Result<()> {
        DocknetOperState::watch_all(self.state.as_ref(), events).await
    }

    fn create_request(&self, docknet_name: &str, config: &NetworkConfig) -> NetworkCreateRequest {
        let mut ipam_config = vec![IpamConfig {
            subnet: config.subnet.to_string(),
            gateway: config.gateway.map(|gw| gw.to_string()),
        }];
        if let Some(subnet) = config.ipv6_subnet {
            ipam_config.push(IpamConfig {
                subnet: subnet.to_string(),
                gateway: config.ipv6_gateway.map(|gw| gw.to_string()),
            });
        }

        let ipam_options = HashMap::from([
            ("tenant".to_string(), config.tenant.clone()),
            ("network".to_string(), config.network_name.clone()),
        ]);

        let driver_options = HashMap::from([
            ("tenant".to_string(), config.tenant.clone()),
            ("encap".to_string(), config.pkt_tag_type.to_string()),
            ("pkt-tag".to_string(), config.packet_tag().to_string()),
        ]);

        NetworkCreateRequest {
            name: docknet_name.to_string(),
            check_duplicate: true,
            driver: self.drivers.network.clone(),
            ipam: IpamSpec {
                driver: self.drivers.ipam.clone(),
                config: ipam_config,
                options: ipam_options,
            },
            options: driver_options,
        }
    }
}
