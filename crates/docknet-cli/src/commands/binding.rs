//! Binding commands: create, delete, find and list docknets

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use docknet_core::{DocknetManager, DocknetOperState, NetworkConfig};

use super::OutputFormat;

/// Binding command implementation
pub struct BindingCommand {
    manager: Arc<DocknetManager>,
}

impl BindingCommand {
    pub fn new(manager: Arc<DocknetManager>) -> Self {
        Self { manager }
    }

    /// Create the docknet of a tenant network from a JSON network config
    pub async fn create(
        &self,
        tenant: &str,
        network: &str,
        service: &str,
        config_path: &Path,
    ) -> Result<()> {
        let content = fs::read_to_string(config_path).with_context(|| {
            format!(
                "Failed to read network configuration: {}",
                config_path.display()
            )
        })?;
        let config = NetworkConfig::from_json(&content)
            .with_context(|| format!("Invalid network configuration: {}", config_path.display()))?;

        let oper = self
            .manager
            .create_binding(tenant, network, service, &config)
            .await
            .with_context(|| format!("Failed to create docknet for {}/{}", tenant, network))?;

        println!("✓ docknet {} bound to network {}", oper.id, oper.docknet_uuid);
        Ok(())
    }

    pub async fn delete(&self, tenant: &str, network: &str, service: &str) -> Result<()> {
        self.manager
            .delete_binding(tenant, network, service)
            .await
            .with_context(|| format!("Failed to delete docknet for {}/{}", tenant, network))?;

        println!("✓ docknet {}.{}.{} removed", tenant, network, service);
        Ok(())
    }

    pub async fn find(&self, network_id: &str, format: OutputFormat) -> Result<()> {
        let oper = self.manager.find_binding_by_network_id(network_id).await?;
        println!("{}", render_bindings(&[oper], format)?);
        Ok(())
    }

    pub async fn list(&self, format: OutputFormat) -> Result<()> {
        let mut bindings = self
            .manager
            .list_bindings()
            .await
            .context("Failed to read docknet oper state")?;
        bindings.sort_by(|a, b| a.id.cmp(&b.id));

        println!("{}", render_bindings(&bindings, format)?);
        Ok(())
    }
}

pub fn render_bindings(bindings: &[DocknetOperState], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(bindings)?);
    }

    let mut out = format!(
        "{:<15} {:<15} {:<15} {}\n{}",
        "Tenant",
        "Network",
        "Service",
        "Network ID",
        "-".repeat(70)
    );
    for oper in bindings {
        let service = if oper.service_name.is_empty() {
            "-"
        } else {
            oper.service_name.as_str()
        };
        out.push_str(&format!(
            "\n{:<15} {:<15} {:<15} {}",
            oper.tenant_name, oper.network_name, service, oper.docknet_uuid
        ));
    }
    Ok(out)
}
