//! Monitor command handler

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::commands::connect;
use crate::config::{Config, NotificationConfig, SessionConfig};
use crate::scheduler::{MonitorLoop, cancel_on_signal, shutdown_channel};
use crate::sinks::notify::GITHUB_API_URL;
use crate::sinks::{ConsoleSink, ExportSink, GitHubNotifier, NotificationSink, build_sinks};

/// Arguments of `monitor`
#[derive(Args)]
pub struct MonitorArgs {
    /// Job ID
    #[arg(long)]
    job_id: String,

    /// Polling interval in seconds
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Overall monitoring timeout in seconds
    #[arg(long, default_value_t = 3600)]
    timeout: u64,

    /// Export monitoring data to this JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Post status changes as GitHub comments
    #[arg(long)]
    notifications: bool,

    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub repository (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    github_repo: Option<String>,

    /// GitHub issue or pull request number
    #[arg(long, env = "GITHUB_ISSUE_NUMBER")]
    github_issue: Option<u64>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    github_api_url: String,
}

impl MonitorArgs {
    /// Turns the arguments into a validated session configuration
    fn session_config(&self) -> Result<SessionConfig> {
        let mut session = SessionConfig::new(self.job_id.clone())
            .with_poll_interval(Duration::from_secs(self.interval))
            .with_timeout(Duration::from_secs(self.timeout));

        if let Some(path) = &self.export {
            session = session.with_export_path(path);
        }

        if self.notifications {
            match NotificationConfig::from_parts(
                self.github_token.clone(),
                self.github_repo.clone(),
                self.github_issue,
            ) {
                Ok(notification) => {
                    info!("GitHub notifications enabled for {}", notification.target());
                    session = session.with_notification(notification);
                }
                Err(missing) => {
                    warn!("GitHub notification requested but missing configuration");
                    warn!("Missing: {}", missing.join(", "));
                    warn!("Pass --github-token, --github-repo, --github-issue or set the variables");
                }
            }
        }

        session.validate()?;
        Ok(session)
    }
}

/// Monitor a job until it terminates
pub async fn handle_monitor_command(args: MonitorArgs, config: &Config) -> Result<()> {
    // Parameters are checked before touching the network
    let session = args.session_config()?;
    let client = connect(config).await?;

    let notification = match &session.notification {
        Some(notification) => {
            let http_client = reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .context("Failed to build notification client")?;
            let notifier = GitHubNotifier::new(http_client, notification.clone())
                .with_api_url(&args.github_api_url);
            Some(NotificationSink::new(notifier))
        }
        None => None,
    };
    let sinks = build_sinks(
        Some(ConsoleSink::new()),
        session.export_path.clone().map(ExportSink::new),
        notification,
    );

    let (sender, token) = shutdown_channel();
    let signal_listener = cancel_on_signal(sender);

    let monitor = MonitorLoop::new(session, Arc::new(client), sinks, token)?;
    info!(
        "Monitoring job {} (session {})",
        monitor.session().config.job_id,
        monitor.session().session_id
    );
    let outcome = monitor.run().await;
    signal_listener.abort();
    match outcome.final_status() {
        Some(status) => info!(
            "Session ended: {} after {} poll(s), last status {}",
            outcome.termination, outcome.polls, status
        ),
        None => info!(
            "Session ended: {} after {} poll(s), no status observed",
            outcome.termination, outcome.polls
        ),
    }
    Ok(())
}
