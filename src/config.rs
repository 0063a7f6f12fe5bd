//! Configuration types for gh-artifact-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Pinned REST API version sent on every request
pub const API_VERSION: &str = "2022-11-28";

/// Name of the wrapper GitHub adds when an artifact itself is a single zip
pub const WRAPPER_NAME: &str = "artifact.zip";

/// GitHub API connection settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST base URL (default: "https://api.github.com")
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Per-request timeout for API calls (default: 30 seconds)
    ///
    /// Archive downloads are streamed and only bounded by the connect phase.
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header (GitHub rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Settings for waiting on an in-progress run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Wait for the run to complete before downloading (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fixed delay between status checks (default: 60 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Maximum time to wait (default: 1800 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

/// Where and how artifacts land on disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "artifacts-<run_id>")
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Put every file of every artifact directly in the output directory (default: true)
    ///
    /// When false each artifact is unpacked into its own subdirectory with the
    /// archive's internal structure preserved.
    #[serde(default = "default_true")]
    pub flatten: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            flatten: true,
        }
    }
}

/// Main configuration for [`ArtifactDownloader`](crate::ArtifactDownloader)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Wait/poll settings
    #[serde(default)]
    pub wait: WaitConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Send desktop notifications (default: true)
    #[serde(default = "default_true")]
    pub notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            wait: WaitConfig::default(),
            output: OutputConfig::default(),
            notifications: true,
        }
    }
}

impl Config {
    /// Check settings that cannot be expressed in the type system
    pub fn validate(&self) -> Result<()> {
        if self.wait.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "poll interval must be at least one second".to_string(),
                key: Some("poll_interval".to_string()),
            });
        }

        let parsed = url::Url::parse(&self.api.url).map_err(|e| Error::Config {
            message: format!("invalid API URL '{}': {}", self.api.url, e),
            key: Some("api_url".to_string()),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("API URL must be http or https, got '{}'", self.api.url),
                key: Some("api_url".to_string()),
            });
        }

        Ok(())
    }

    /// Output directory for a run, falling back to `artifacts-<run_id>`
    pub fn output_dir_for(&self, run_id: u64) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("artifacts-{}", run_id)))
    }
}

/// REST base URL for a web host
///
/// `github.com` is served from `api.github.com`; GitHub Enterprise Server
/// hosts expose the API under `/api/v3`.
pub fn api_url_for_host(host: &str) -> String {
    if host.eq_ignore_ascii_case("github.com") || host.eq_ignore_ascii_case("www.github.com") {
        DEFAULT_API_URL.to_string()
    } else {
        format!("https://{}/api/v3", host)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("gh-artifact-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(1800)
}

fn default_true() -> bool {
    true
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
