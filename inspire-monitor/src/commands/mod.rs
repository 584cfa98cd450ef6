//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod monitor;
mod status;

pub use monitor::MonitorArgs;
pub use status::StatusArgs;

use anyhow::{Context, Result};
use clap::Subcommand;
use inspire_client::InspireClient;
use tracing::info;

use crate::config::Config;
use crate::error::MonitorError;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Monitor a job until it finishes, times out or is interrupted
    Monitor(MonitorArgs),
    /// Query the current status of a job once
    Status(StatusArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The API configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Monitor(args) => monitor::handle_monitor_command(args, config).await,
        Commands::Status(args) => status::handle_status_command(args, config).await,
    }
}

/// Build an HTTP client and authenticate it
async fn connect(config: &Config) -> Result<InspireClient> {
    config.validate()?;

    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let mut client =
        InspireClient::with_client(&config.base_url, http_client).with_retry_policy(config.retry);

    info!("Authenticating with Inspire API at {}...", client.base_url());
    client
        .authenticate(&config.credentials.username, &config.credentials.password)
        .await
        .map_err(MonitorError::Authentication)?;

    Ok(client)
}
