//! Container runtime network interface

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Network as reported by the container runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkHandle {
    pub id: String,
    #[serde(default)]
    pub driver: String,
}

/// One address pool of a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpamConfig {
    pub subnet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Address management section of a network create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpamSpec {
    pub driver: String,
    pub config: Vec<IpamConfig>,
    pub options: HashMap<String, String>,
}

/// Network create request, laid out as the Docker Engine API expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkCreateRequest {
    pub name: String,
    pub check_duplicate: bool,
    pub driver: String,
    #[serde(rename = "IPAM")]
    pub ipam: IpamSpec,
    pub options: HashMap<String, String>,
}

/// Client of the container runtime owning the networks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkRuntime: Send + Sync {
    /// Look up a network by name, `None` when the runtime has no such network
    async fn inspect_network(&self, name: &str) -> Result<Option<NetworkHandle>>;

    /// Create a network and return the handle assigned by the runtime
    async fn create_network(&self, request: &NetworkCreateRequest) -> Result<NetworkHandle>;

    /// Remove a network by name
    async fn remove_network(&self, name: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_wire_layout() {
        let request = NetworkCreateRequest {
            name: "db.acme".to_string(),
            check_duplicate: true,
            driver: "netplugin".to_string(),
            ipam: IpamSpec {
                driver: "netplugin".to_string(),
                config: vec![IpamConfig {
                    subnet: "10.1.1.0/24".to_string(),
                    gateway: None,
                }],
                options: HashMap::from([("tenant".to_string(), "acme".to_string())]),
            },
            options: HashMap::new(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["Name"], "db.acme");
        assert_eq!(json["CheckDuplicate"], true);
        assert_eq!(json["IPAM"]["Driver"], "netplugin");
        assert_eq!(json["IPAM"]["Config"][0]["Subnet"], "10.1.1.0/24");
        assert!(json["IPAM"]["Config"][0].get("Gateway").is_none());
        assert_eq!(json["IPAM"]["Options"]["tenant"], "acme");
    }

    #[test]
    fn test_handle_from_inspect_response() {
        let handle: NetworkHandle = serde_json::from_str(
            r#"{"Name": "db.acme", "Id": "7d86d31b", "Driver": "netplugin", "Scope": "local"}"#,
        )
        .unwrap();
        assert_eq!(handle.id, "7d86d31b");
        assert_eq!(handle.driver, "netplugin");
    }
}
