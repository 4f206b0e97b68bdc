//! Name encode/decode commands

use anyhow::{Context, Result};
use docknet_core::{decode_docknet_name, encode_docknet_name};

use super::OutputFormat;

/// Name command implementation
#[derive(Default)]
pub struct NameCommand;

impl NameCommand {
    pub fn new() -> Self {
        Self
    }

    /// Print the runtime network name of a tenant network
    pub fn encode(&self, tenant: &str, network: &str, epg: &str, service: &str) -> Result<()> {
        println!("{}", encode_docknet_name(tenant, network, epg, service));
        Ok(())
    }

    /// Print tenant, network and service of a runtime network name
    pub fn decode(&self, name: &str, format: OutputFormat) -> Result<()> {
        println!("{}", self.render_decoded(name, format)?);
        Ok(())
    }

    pub fn render_decoded(&self, name: &str, format: OutputFormat) -> Result<String> {
        let decoded = decode_docknet_name(name)
            .with_context(|| format!("Failed to parse network name '{}'", name))?;

        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&decoded)?),
            OutputFormat::Text => Ok(format!(
                "{:<10} {}\n{:<10} {}\n{:<10} {}",
                "Tenant:",
                decoded.tenant,
                "Network:",
                decoded.network,
                "Service:",
                if decoded.service.is_empty() {
                    "-"
                } else {
                    decoded.service.as_str()
                }
            )),
        }
    }
}
