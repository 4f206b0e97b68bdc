//! Docknet CLI (docknetctl)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docknetctl::commands::{BindingCommand, NameCommand, OutputFormat, WatchCommand};
use docknetctl::context::AppContext;
use docknetctl::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "docknetctl")]
#[command(about = "Container runtime networks of tenant networks")]
#[command(version)]
#[command(long_about = "
Docknet CLI

Creates and removes the container runtime network backing a tenant network,
and keeps track of which runtime network belongs to which tenant network.

Examples:
  docknetctl encode -t acme -n db                   # Print the runtime network name
  docknetctl decode svc__net.acme                   # Split a runtime name
  docknetctl create -t acme -n db -c db.json        # Create and record a docknet
  docknetctl delete -t acme -n db                   # Remove a docknet
  docknetctl find 7d86d31b1478                      # Tenant network of a runtime id
  docknetctl list -f json                           # All recorded docknets
  docknetctl watch                                  # Follow docknet changes
")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file (default: /etc/docknet/docknet.toml or ./docknet.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the runtime network name of a tenant network
    Encode {
        #[arg(short, long, default_value = "default")]
        tenant: String,

        #[arg(short, long)]
        network: String,

        /// Endpoint group, replaces the network name
        #[arg(short, long, default_value = "")]
        epg: String,

        #[arg(short, long, default_value = "")]
        service: String,
    },

    /// Split a runtime network name into tenant, network and service
    Decode {
        name: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create the runtime network of a tenant network and record it
    Create {
        #[arg(short, long, default_value = "default")]
        tenant: String,

        #[arg(short, long)]
        network: String,

        #[arg(short, long, default_value = "")]
        service: String,

        /// Network configuration (JSON)
        #[arg(short = 'c', long)]
        network_config: PathBuf,
    },

    /// Remove the runtime network of a tenant network
    Delete {
        #[arg(short, long, default_value = "default")]
        tenant: String,

        #[arg(short, long)]
        network: String,

        #[arg(short, long, default_value = "")]
        service: String,
    },

    /// Find the tenant network of a runtime network id
    Find {
        network_id: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List all recorded docknets
    List {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Follow docknet changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = run(&cli).await;

    // Handle errors with appropriate exit codes
    match result {
        Ok(()) => {
            if !cli.quiet {
                log::info!("Command completed successfully");
            }
            std::process::exit(0);
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);

                // Print error chain if in verbose mode
                if cli.verbose || cli.debug {
                    for cause in e.chain().skip(1) {
                        eprintln!("  Caused by: {}", cause);
                    }
                }
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // Name commands need neither settings nor collaborators
    match &cli.command {
        Commands::Encode {
            tenant,
            network,
            epg,
            service,
        } => return NameCommand::new().encode(tenant, network, epg, service),
        Commands::Decode { name, format } => return NameCommand::new().decode(name, *format),
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let context = AppContext::bootstrap(settings)?;

    match &cli.command {
        Commands::Create {
            tenant,
            network,
            service,
            network_config,
        } => {
            BindingCommand::new(context.manager.clone())
                .create(tenant, network, service, network_config)
                .await
        }

        Commands::Delete {
            tenant,
            network,
            service,
        } => {
            BindingCommand::new(context.manager.clone())
                .delete(tenant, network, service)
                .await
        }

        Commands::Find { network_id, format } => {
            BindingCommand::new(context.manager.clone())
                .find(network_id, *format)
                .await
        }

        Commands::List { format } => {
            BindingCommand::new(context.manager.clone())
                .list(*format)
                .await
        }

        Commands::Watch => WatchCommand::new(context.manager.clone()).execute().await,

        Commands::Encode { .. } | Commands::Decode { .. } => Ok(()),
    }
}
