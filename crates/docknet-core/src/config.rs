//! Caller-side network configuration consumed when a docknet is created

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::DocknetError;
use crate::Result;

/// Packet encapsulation used by a tenant network
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EncapType {
    Vlan,
    Vxlan,
}

impl std::fmt::Display for EncapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncapType::Vlan => write!(f, "vlan"),
            EncapType::Vxlan => write!(f, "vxlan"),
        }
    }
}

/// Subnet, gateway and tag allocation of a tenant network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub tenant: String,
    pub network_name: String,
    pub pkt_tag_type: EncapType,
    /// Tag used on the wire inside the fabric (VLAN id)
    #[serde(default)]
    pub pkt_tag: u32,
    /// Tag used for tunnelled traffic (VNI)
    #[serde(default)]
    pub ext_pkt_tag: u32,
    pub subnet: IpNet,
    #[serde(default)]
    pub gateway: Option<IpAddr>,
    #[serde(default)]
    pub ipv6_subnet: Option<IpNet>,
    #[serde(default)]
    pub ipv6_gateway: Option<IpAddr>,
}

impl NetworkConfig {
    pub fn new(
        tenant: impl Into<String>,
        network_name: impl Into<String>,
        pkt_tag_type: EncapType,
        subnet: IpNet,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            network_name: network_name.into(),
            pkt_tag_type,
            pkt_tag: 0,
            ext_pkt_tag: 0,
            subnet,
            gateway: None,
            ipv6_subnet: None,
            ipv6_gateway: None,
        }
    }

    /// Load a configuration from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| DocknetError::InvalidConfig {
            field: "json".to_string(),
            reason: err.to_string(),
        })
    }

    /// Tag handed to the network driver: VXLAN networks carry the external
    /// tag, everything else the internal one.
    pub fn packet_tag(&self) -> u32 {
        match self.pkt_tag_type {
            EncapType::Vxlan => self.ext_pkt_tag,
            EncapType::Vlan => self.pkt_tag,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tenant.is_empty() {
            return Err(invalid("tenant", "tenant name cannot be empty"));
        }

        if self.network_name.is_empty() {
            return Err(invalid("networkName", "network name cannot be empty"));
        }

        if let Some(gateway) = self.gateway {
            if !self.subnet.contains(&gateway) {
                return Err(invalid(
                    "gateway",
                    &format!("{} is outside subnet {}", gateway, self.subnet),
                ));
            }
        }

        match (self.ipv6_subnet, self.ipv6_gateway) {
            (None, Some(_)) => {
                return Err(invalid(
                    "ipv6Gateway",
                    "IPv6 gateway requires an IPv6 subnet",
                ));
            }
            (Some(subnet), Some(gateway)) if !subnet.contains(&gateway) => {
                return Err(invalid(
                    "ipv6Gateway",
                    &format!("{} is outside subnet {}", gateway, subnet),
                ));
            }
            _ => {}
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> DocknetError {
    DocknetError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
