//! Docknet State
//!
//! Directory backed implementation of the docknet state store. Each key is a
//! file below the base directory, so a directory shared through a cluster
//! file system gives every node the same view of the oper records.

pub mod file;

pub use file::{FileStateDriver, DEFAULT_POLL_INTERVAL, DEFAULT_STATE_DIR};
