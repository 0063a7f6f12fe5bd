//! Core types for gh-artifact-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Repository and run id pair that identifies a workflow run
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunTarget {
    /// Owning repository as `owner/name`
    pub repo: String,
    /// Numeric workflow run id
    pub run_id: u64,
}

impl RunTarget {
    /// Create a target, validating the `owner/name` shape of `repo`
    pub fn new(repo: impl Into<String>, run_id: u64) -> Result<Self> {
        let repo = repo.into();
        let mut parts = repo.split('/');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !valid {
            return Err(Error::InvalidInput(format!(
                "repository must be in 'owner/repo' form, got '{}'",
                repo
            )));
        }
        Ok(Self { repo, run_id })
    }
}

impl std::fmt::Display for RunTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repo, self.run_id)
    }
}

/// Lifecycle state of a workflow run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    /// Waiting for a runner
    Queued,
    /// Jobs are executing
    InProgress,
    /// Finished; a conclusion is set
    Completed,
    /// Waiting on a deployment protection rule
    Waiting,
    /// Created but not yet queued
    Requested,
    /// Pending concurrency slot
    Pending,
    /// Any status this tool does not know about
    Other(String),
}

impl RunStatus {
    /// Whether the run has reached its terminal state
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }

    /// The API string for this status
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Waiting => "waiting",
            RunStatus::Requested => "requested",
            RunStatus::Pending => "pending",
            RunStatus::Other(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            "waiting" => RunStatus::Waiting,
            "requested" => RunStatus::Requested,
            "pending" => RunStatus::Pending,
            _ => RunStatus::Other(s),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a completed run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Conclusion {
    /// All required jobs passed
    Success,
    /// At least one job failed
    Failure,
    /// Cancelled by a user or concurrency group
    Cancelled,
    /// Skipped by conditions
    Skipped,
    /// Exceeded its time limit
    TimedOut,
    /// Needs manual approval
    ActionRequired,
    /// Neither success nor failure
    Neutral,
    /// Superseded
    Stale,
    /// Failed to start
    StartupFailure,
    /// Any conclusion this tool does not know about
    Other(String),
}

impl Conclusion {
    /// Whether artifacts may be downloaded for this conclusion
    pub fn is_success(&self) -> bool {
        matches!(self, Conclusion::Success)
    }

    /// The API string for this conclusion
    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::TimedOut => "timed_out",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Neutral => "neutral",
            Conclusion::Stale => "stale",
            Conclusion::StartupFailure => "startup_failure",
            Conclusion::Other(s) => s,
        }
    }
}

impl From<String> for Conclusion {
    fn from(s: String) -> Self {
        match s.as_str() {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "cancelled" => Conclusion::Cancelled,
            "skipped" => Conclusion::Skipped,
            "timed_out" => Conclusion::TimedOut,
            "action_required" => Conclusion::ActionRequired,
            "neutral" => Conclusion::Neutral,
            "stale" => Conclusion::Stale,
            "startup_failure" => Conclusion::StartupFailure,
            _ => Conclusion::Other(s),
        }
    }
}

impl From<Conclusion> for String {
    fn from(conclusion: Conclusion) -> Self {
        conclusion.as_str().to_string()
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow run as returned by `GET /repos/{repo}/actions/runs/{run_id}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDescriptor {
    /// Numeric run id
    pub id: u64,
    /// Workflow name shown in the UI
    #[serde(default)]
    pub name: Option<String>,
    /// Per-workflow sequence number
    pub run_number: u64,
    /// Current lifecycle state
    pub status: RunStatus,
    /// Set once `status` becomes `completed`
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    /// Browser URL of the run
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RunDescriptor {
    /// Run name, or "Unknown" when the API omitted it
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// An artifact as returned by `GET /repos/{repo}/actions/runs/{run_id}/artifacts`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Artifact id
    #[serde(default)]
    pub id: u64,
    /// Artifact name; not unique across a run
    pub name: String,
    /// Zip download locator
    pub archive_download_url: String,
    /// Expired artifacts can no longer be downloaded
    #[serde(default)]
    pub expired: bool,
    /// Compressed size reported by GitHub
    #[serde(default)]
    pub size_in_bytes: u64,
}

/// One page of the artifact listing
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ArtifactPage {
    /// Total artifacts across all pages
    #[serde(default)]
    pub total_count: u64,
    /// Artifacts on this page
    #[serde(default)]
    pub artifacts: Vec<ArtifactDescriptor>,
}

/// Orchestrator state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Fetching the run descriptor
    Fetching,
    /// Polling until the run completes
    Waiting,
    /// Checking the run conclusion
    Verifying,
    /// Listing artifacts
    Listing,
    /// Fetching and unpacking artifacts
    Downloading,
    /// All artifacts handled
    Done,
    /// Terminated early
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Fetching => "fetching",
            Stage::Waiting => "waiting",
            Stage::Verifying => "verifying",
            Stage::Listing => "listing",
            Stage::Downloading => "downloading",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful run of the tool
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Directory that received the artifacts
    pub output_dir: PathBuf,
    /// Artifacts fetched and unpacked
    pub artifacts_downloaded: usize,
    /// Artifacts skipped because their directory was already populated
    pub artifacts_skipped: usize,
    /// Every file placed on disk, in extraction order
    pub files: Vec<PathBuf>,
}

impl DownloadSummary {
    /// Total number of extracted files across all artifacts
    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}
