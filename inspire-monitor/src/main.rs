//! Inspire Monitor
//!
//! Command-line tool that watches training jobs on the Inspire platform,
//! reports status transitions and exports the observed history.

mod commands;
mod config;
mod error;
mod repository;
mod scheduler;
mod session;
mod sinks;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, Credentials};
use inspire_client::DEFAULT_BASE_URL;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inspire-monitor")]
#[command(about = "Inspire training job status monitor", long_about = None)]
struct Cli {
    /// Inspire API base URL
    #[arg(long, env = "INSPIRE_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Inspire account name
    #[arg(long, env = "INSPIRE_USERNAME", global = true)]
    username: Option<String>,

    /// Inspire account password
    #[arg(long, env = "INSPIRE_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "inspire_monitor=debug,inspire_client=debug"
    } else {
        "inspire_monitor=info,inspire_client=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let credentials = Credentials::new(
        cli.username.unwrap_or_default(),
        cli.password.unwrap_or_default(),
    );
    let config = Config::new(cli.base_url, credentials);

    handle_command(cli.command, &config).await
}
