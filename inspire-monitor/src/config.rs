//! Monitor configuration
//!
//! Defines the API connection settings and the parameters of a monitoring
//! session (polling cadence, overall timeout, export file, notification
//! target), together with their validation.

use inspire_client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, RetryPolicy};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::MonitorError;

/// Smallest accepted polling interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default overall session timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// API connection settings
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL (e.g., "https://qz.sii.edu.cn")
    pub base_url: String,

    /// Per-request timeout of the HTTP client
    pub request_timeout: Duration,

    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,

    /// Account used to acquire the bearer token
    pub credentials: Credentials,
}

impl Config {
    /// Creates a configuration with default timeouts and retries
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            credentials,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.base_url.is_empty() {
            return Err(MonitorError::configuration("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(MonitorError::configuration(
                "base_url must start with http:// or https://",
            ));
        }

        self.credentials.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Credentials::default())
    }
}

/// Username and password for the token endpoint
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> Result<(), MonitorError> {
        if self.username.trim().is_empty() {
            return Err(MonitorError::configuration(
                "Username not found. Please set INSPIRE_USERNAME or pass --username",
            ));
        }
        if self.password.is_empty() {
            return Err(MonitorError::configuration(
                "Password not found. Please set INSPIRE_PASSWORD or pass --password",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters of one monitoring session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Job to observe
    pub job_id: String,

    /// Wait between two polls
    pub poll_interval: Duration,

    /// Overall observation budget, checked before each poll
    pub timeout: Duration,

    /// Where to write the monitoring record, if anywhere
    pub export_path: Option<PathBuf>,

    /// Where to post transition messages, if anywhere
    pub notification: Option<NotificationConfig>,
}

impl SessionConfig {
    /// Creates a session configuration with default cadence
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            export_path: None,
            notification: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    pub fn with_notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Validates the session parameters
    ///
    /// Requires a non-empty job id, an interval of at least one second and
    /// a timeout no shorter than the interval.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.job_id.trim().is_empty() {
            return Err(MonitorError::configuration("job_id cannot be empty"));
        }

        if self.poll_interval < MIN_POLL_INTERVAL {
            return Err(MonitorError::configuration(format!(
                "poll interval must be at least {:?}",
                MIN_POLL_INTERVAL
            )));
        }

        if self.timeout < self.poll_interval {
            return Err(MonitorError::configuration(format!(
                "timeout ({:?}) must not be shorter than the poll interval ({:?})",
                self.timeout, self.poll_interval
            )));
        }

        if let Some(path) = &self.export_path {
            if path.as_os_str().is_empty() || path.file_name().is_none() {
                return Err(MonitorError::configuration(format!(
                    "export path {} does not name a file",
                    path.display()
                )));
            }
        }

        if let Some(notification) = &self.notification {
            notification.validate()?;
        }

        Ok(())
    }
}

/// GitHub issue (or pull request) that receives transition comments
#[derive(Clone)]
pub struct NotificationConfig {
    /// Access token used to post comments
    pub token: String,

    /// Repository in `owner/repo` form
    pub repo: String,

    /// Issue or pull request number
    pub issue_number: u64,
}

impl NotificationConfig {
    /// Builds a notification target from optional settings
    ///
    /// Returns the names of the missing settings when any is absent.
    pub fn from_parts(
        token: Option<String>,
        repo: Option<String>,
        issue_number: Option<u64>,
    ) -> Result<Self, Vec<&'static str>> {
        let token = token.filter(|t| !t.is_empty());
        let repo = repo.filter(|r| !r.is_empty());

        match (token, repo, issue_number) {
            (Some(token), Some(repo), Some(issue_number)) => Ok(Self {
                token,
                repo,
                issue_number,
            }),
            (token, repo, issue) => {
                let mut missing = Vec::new();
                if token.is_none() {
                    missing.push("GITHUB_TOKEN");
                }
                if repo.is_none() {
                    missing.push("GITHUB_REPOSITORY");
                }
                if issue.is_none() {
                    missing.push("GITHUB_ISSUE_NUMBER");
                }
                Err(missing)
            }
        }
    }

    /// Human-readable target, e.g. `owner/repo#12`
    pub fn target(&self) -> String {
        format!("{}#{}", self.repo, self.issue_number)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.token.trim().is_empty() {
            return Err(MonitorError::configuration("GitHub token cannot be empty"));
        }

        let valid_repo = matches!(
            self.repo.split_once('/'),
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
        );
        if !valid_repo {
            return Err(MonitorError::configuration(format!(
                "GitHub repository must be in owner/repo form, got '{}'",
                self.repo
            )));
        }

        if self.issue_number == 0 {
            return Err(MonitorError::configuration(
                "GitHub issue number must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("issue_number", &self.issue_number)
            .finish()
    }
}
