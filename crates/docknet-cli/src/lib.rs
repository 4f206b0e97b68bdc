//! Docknet CLI
//!
//! Command-line tool for the container runtime networks of tenant networks:
//! encoding and parsing docknet names, creating and removing docknets, and
//! inspecting the recorded oper state.

pub mod commands;
pub mod context;
pub mod settings;

#[cfg(test)]
mod tests;
