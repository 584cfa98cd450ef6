//! Notification sink
//!
//! Renders a markdown message for each reportable transition and posts it
//! to a single external target. Delivery is fire-and-forget: a failed post
//! is logged by the monitor loop and never retried.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use inspire_core::domain::{JobStatus, Snapshot};
use inspire_core::format::{format_duration_ms, format_timestamp};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use super::{Report, ReportSink};
use crate::config::NotificationConfig;
use crate::error::SinkError;

/// Default GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Something that can post a text message to a fixed target
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Description of the target, for logs
    fn target(&self) -> String;

    /// Posts `text` to the target
    async fn post(&self, text: &str) -> Result<(), SinkError>;
}

/// Render the transition message for `current`
///
/// # Arguments
/// * `current` - The snapshot being reported
/// * `previous` - The snapshot before it, `None` for the first observation
/// * `now` - Time shown in the footer
pub fn render_message(
    current: &Snapshot,
    previous: Option<&Snapshot>,
    now: DateTime<Local>,
) -> String {
    let heading = if previous.is_none() {
        "Initial Status"
    } else {
        "Status Changed"
    };

    let mut text = format!("{} **{}**\n\n", current.status.marker(), heading);
    text.push_str(&format!("- **Job ID:** `{}`\n", current.job_id));
    text.push_str(&format!("- **Status:** {}\n", current.status));

    if !current.sub_msg.is_empty() {
        text.push_str(&format!("- **Message:** {}\n", current.sub_msg));
    }

    text.push_str(&format!(
        "- **Running Time:** {}\n",
        format_duration_ms(current.running_time_ms)
    ));

    if current.node_count > 0 {
        text.push_str(&format!("- **Nodes:** {}\n", current.node_count));
    }

    if let Some(timeline) = &current.timeline {
        for (phase, raw) in timeline.phases() {
            text.push_str(&format!(
                "- **{}:** {}\n",
                phase.long_label(),
                format_timestamp(raw)
            ));
        }
    }

    match current.status {
        JobStatus::Succeeded => text.push_str("\n🎉 **Training completed successfully!**"),
        JobStatus::Failed => {
            text.push_str("\n💥 **Training failed.** Check the logs for details.")
        }
        JobStatus::Cancelled => text.push_str("\n🛑 **Training was cancelled.**"),
        JobStatus::Pending | JobStatus::Running | JobStatus::Unknown => {}
    }

    text.push_str(&format!(
        "\n\n*Updated at {}*",
        now.format("%Y-%m-%d %H:%M:%S")
    ));
    text
}

/// Sink that renders transitions and hands them to a [`Notifier`]
pub struct NotificationSink {
    notifier: Box<dyn Notifier>,
}

impl NotificationSink {
    pub fn new(notifier: impl Notifier + 'static) -> Self {
        Self {
            notifier: Box::new(notifier),
        }
    }
}

#[async_trait]
impl ReportSink for NotificationSink {
    fn name(&self) -> &'static str {
        "notification"
    }

    async fn report(&self, report: &Report<'_>) -> Result<(), SinkError> {
        info!(
            "Notification: job {} status changed to {}",
            report.current.job_id, report.current.status
        );
        let text = render_message(report.current, report.previous, Local::now());
        self.notifier.post(&text).await?;
        info!("Notification sent to {}", self.notifier.target());
        Ok(())
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Posts messages as comments on a GitHub issue or pull request
#[derive(Debug, Clone)]
pub struct GitHubNotifier {
    client: Client,
    api_url: String,
    config: NotificationConfig,
}

impl GitHubNotifier {
    pub fn new(client: Client, config: NotificationConfig) -> Self {
        Self {
            client,
            api_url: GITHUB_API_URL.to_string(),
            config,
        }
    }

    /// Use a different API base URL (GitHub Enterprise, tests)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn comments_url(&self) -> String {
        format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_url, self.config.repo, self.config.issue_number
        )
    }
}

#[async_trait]
impl Notifier for GitHubNotifier {
    fn target(&self) -> String {
        self.config.target()
    }

    async fn post(&self, text: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.comments_url())
            .header("Authorization", format!("token {}", self.config.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "inspire-monitor")
            .json(&CommentBody { body: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SinkError::NotificationRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
