//! Docknet name encoding
//!
//! A tenant network is flattened into one runtime network name:
//!
//! ```text
//! [service]{epg|network}[.tenant]
//! ```
//!
//! The tenant suffix is left out for the default tenant. Two name formats are
//! understood when parsing a name back, tried in order:
//!
//! * slash format: `[service.]network[/tenant]`
//! * dotted format: `[service__]network[.tenant]`

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::DocknetError;
use crate::Result;

/// Tenant name that is never written into an encoded name
pub const DEFAULT_TENANT_NAME: &str = "default";

/// Tenant, network and service recovered from a docknet name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocknetName {
    pub tenant: String,
    pub network: String,
    pub service: String,
}

impl DocknetName {
    pub fn new(
        tenant: impl Into<String>,
        network: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            network: network.into(),
            service: service.into(),
        }
    }

    /// Encoded runtime name for this tenant network (no endpoint group)
    pub fn encode(&self) -> String {
        encode_docknet_name(&self.tenant, &self.network, "", &self.service)
    }

    fn with_tenant(base: (&str, &str), tenant: Option<&str>) -> Self {
        let (service, network) = base;
        Self::new(tenant.unwrap_or(DEFAULT_TENANT_NAME), network, service)
    }
}

impl fmt::Display for DocknetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tenant={} network={} service={}",
            self.tenant, self.network, self.service
        )
    }
}

impl FromStr for DocknetName {
    type Err = DocknetError;

    fn from_str(s: &str) -> Result<Self> {
        decode_docknet_name(s)
    }
}

/// Build the runtime network name for a tenant network.
///
/// The endpoint group, when given, replaces the network name. The service
/// name is prepended without any separator, so `("acme", "db", "", "api")`
/// becomes `apidb.acme` and the service cannot be split off again when
/// parsing.
pub fn encode_docknet_name(tenant: &str, network: &str, epg: &str, service: &str) -> String {
    let mut name = if epg.is_empty() {
        network.to_string()
    } else {
        epg.to_string()
    };

    if tenant != DEFAULT_TENANT_NAME {
        name.push('.');
        name.push_str(tenant);
    }

    if !service.is_empty() {
        name.insert_str(0, service);
    }

    name
}

/// Parse a runtime network name back into tenant, network and service.
pub fn decode_docknet_name(name: &str) -> Result<DocknetName> {
    debug!("Parsing docknet name: {}", name);

    if name.is_empty() {
        return Err(invalid_format(name));
    }

    NAME_FORMATS
        .iter()
        .find(|format| format.accepts(name))
        .and_then(|format| {
            let parsed = format.parse(name);
            if parsed.is_none() {
                debug!("'{}' rejected by {} format", name, format.label());
            }
            parsed
        })
        .ok_or_else(|| invalid_format(name))
}

fn invalid_format(name: &str) -> DocknetError {
    log::error!("Invalid network name format for network '{}'", name);
    DocknetError::InvalidFormat {
        name: name.to_string(),
    }
}

/// One historical layout of a docknet name
trait NameFormat: Sync {
    fn label(&self) -> &'static str;

    /// Whether this format is responsible for the given name
    fn accepts(&self, name: &str) -> bool;

    /// `None` when the name is malformed for this format
    fn parse(&self, name: &str) -> Option<DocknetName>;
}

/// Priority order matters: the dotted format accepts everything.
const NAME_FORMATS: &[&dyn NameFormat] = &[&SlashFormat, &DottedFormat];

/// `[service.]network[/tenant]`
struct SlashFormat;

impl NameFormat for SlashFormat {
    fn label(&self) -> &'static str {
        "slash"
    }

    fn accepts(&self, name: &str) -> bool {
        name.contains('/')
    }

    fn parse(&self, name: &str) -> Option<DocknetName> {
        let parts: Vec<&str> = name.split('/').collect();
        match parts.as_slice() {
            [base] => Some(DocknetName::with_tenant(split_service(base, "."), None)),
            [base, tenant] => Some(DocknetName::with_tenant(
                split_service(base, "."),
                Some(*tenant),
            )),
            _ => None,
        }
    }
}

/// `[service__]network[.tenant]`
struct DottedFormat;

impl NameFormat for DottedFormat {
    fn label(&self) -> &'static str {
        "dotted"
    }

    fn accepts(&self, _name: &str) -> bool {
        true
    }

    fn parse(&self, name: &str) -> Option<DocknetName> {
        let parts: Vec<&str> = name.split('.').collect();
        match parts.as_slice() {
            [base] => Some(DocknetName::with_tenant(split_service(base, "__"), None)),
            [base, tenant] => Some(DocknetName::with_tenant(
                split_service(base, "__"),
                Some(*tenant),
            )),
            _ => None,
        }
    }
}

/// Split `service<sep>network`. Anything other than exactly two pieces is
/// taken as a bare network name made of the first piece.
fn split_service<'a>(base: &'a str, separator: &str) -> (&'a str, &'a str) {
    let pieces: Vec<&str> = base.split(separator).collect();
    match pieces.as_slice() {
        [service, network] => (*service, *network),
        _ => ("", pieces[0]),
    }
}
