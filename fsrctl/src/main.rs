//! Command-line interface for FortiSOAR

use clap::Parser;
use std::process;
use tracing::{debug, info, Level};

mod auth;
mod cli;
mod client;
mod commands;
mod config;
mod output;
mod state;

use cli::*;
use config::{ConfigLayer, ConfigStore};
use state::CliState;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration: file, then environment, then flags
    let loaded = ConfigStore::locate(args.config.clone())
        .and_then(|store| Ok((store.load(Some(ConfigLayer::from_cli(&args)))?, store)));

    let (config, store) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            output::error(&format!("Failed to load configuration: {}", e));
            process::exit(1);
        }
    };

    info!(
        "Using configuration {} (server: {})",
        store.path().display(),
        config.server.as_deref().unwrap_or("<unset>")
    );

    let mut state = CliState::new(config, store);

    // Execute command
    let result = match args.command {
        Commands::Alerts { command } => {
            commands::alerts::handle_alert_command(command, &mut state).await
        }
        Commands::Files { command } => {
            commands::files::handle_file_command(command, &mut state).await
        }
        Commands::Http { command } => {
            commands::http::handle_http_command(command, &mut state).await
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &mut state).await
        }
    };

    match result {
        Ok(_) => {
            debug!("API session used: {}", state.has_client());
            info!("Command completed successfully");
        }
        Err(e) => {
            debug!("Command failed: {:?}", e);
            output::error(&e.to_string());
            process::exit(1);
        }
    }
}
