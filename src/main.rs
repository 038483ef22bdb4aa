//! Pub/Sub push relay - Main Entry Point

use clap::{Parser, Subcommand};
use pubsub_relay::config::RelayConfig;
use pubsub_relay::observability::init_default_logging;
use pubsub_relay::server::{self, RelayState};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

/// Pub/Sub broker push relay
#[derive(Parser)]
#[command(name = "pubsub-relay")]
#[command(about = "Receives broker push batches, archives topic-matched messages, forwards all")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Run,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("Starting pubsub-relay v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run => run_relay(config).await,
        Commands::Config { show } => handle_config_command(config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    info!("Shutdown complete");
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<RelayConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(RelayConfig::load_from_file(path)?)
        }
        None => {
            // Try default locations
            let default_paths = vec!["relay.toml", "config/relay.toml"];

            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(RelayConfig::load_from_file(&path)?);
                }
            }

            error!("No configuration file found. Please provide one with -c/--config or create relay.toml");
            process::exit(1);
        }
    }
}

async fn run_relay(config: RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.socket_addr()?;
    let state = Arc::new(RelayState::from_config(&config)?);

    info!(
        "Relay configured: archive prefix '{}', bucket '{}'",
        config.archive.topic_prefix, config.archive.bucket
    );

    server::run(state, addr).await?;
    Ok(())
}

fn handle_config_command(
    config: RelayConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
