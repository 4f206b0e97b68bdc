//! CLI commands

pub mod binding;
pub mod name;
pub mod watch;

pub use binding::BindingCommand;
pub use name::NameCommand;
pub use watch::WatchCommand;

/// Output format of commands printing records
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
