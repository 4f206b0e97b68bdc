//! Docknet Core
//!
//! Maps a tenant network (tenant, network, optional endpoint group, optional
//! service) to the single network name handed to the container runtime, and
//! keeps the operational record of every network created that way.

pub mod binding;
pub mod config;
pub mod error;
pub mod naming;
pub mod oper;
pub mod runtime;
pub mod state;


pub use binding::{DocknetManager, DriverNames, DEFAULT_DRIVER_NAME};
pub use config::{EncapType, NetworkConfig};
pub use error::{DocknetError, StateError};
pub use naming::{decode_docknet_name, encode_docknet_name, DocknetName, DEFAULT_TENANT_NAME};
pub use oper::{DocknetOperState, OperKey, DOCKNET_OPER_PREFIX};
pub use runtime::{IpamConfig, IpamSpec, NetworkCreateRequest, NetworkHandle, NetworkRuntime};
pub use state::{MemoryStateDriver, StateDriver, WatchEvent};

/// Result type for docknet operations
pub type Result<T> = std::result::Result<T, DocknetError>;
