//! Status command handler

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::connect;
use crate::config::Config;
use crate::sinks::ConsoleSink;

/// Arguments of `status`
#[derive(Args)]
pub struct StatusArgs {
    /// Job ID
    #[arg(long)]
    job_id: String,

    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Fetch the status of a job once and print it
pub async fn handle_status_command(args: StatusArgs, config: &Config) -> Result<()> {
    let client = connect(config).await?;

    let snapshot = client
        .fetch_job_status(&args.job_id)
        .await
        .context("Failed to get job status")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{}", json);
    } else {
        ConsoleSink::print_summary(&snapshot);
    }

    Ok(())
}
