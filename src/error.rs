//! Error types for gh-artifact-dl
//!
//! This module provides the error taxonomy for the tool:
//! - Transport failures (network faults, non-2xx responses, undecodable bodies)
//! - Wait timeouts, invalid operator input, missing credentials
//! - Extraction failures (corrupt archives, unsafe paths, unresolvable name conflicts)
//! - Outcome failures (unsuccessful conclusion, nothing to download)
//!
//! Every fatal error maps to a process exit code and a machine-readable code via
//! [`ToExitCode`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for gh-artifact-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gh-artifact-dl
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP-level failure talking to the GitHub API or artifact storage
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The run did not reach `completed` within the wait budget
    #[error("workflow run {run_id} did not complete within {} seconds", timeout.as_secs())]
    Timeout {
        /// The run being waited on
        run_id: u64,
        /// The configured wait budget
        timeout: Duration,
    },

    /// Malformed run URL, missing run id, or other bad operator input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "poll_interval")
        key: Option<String>,
    },

    /// No credential source produced a token
    #[error("GitHub token not found: {0}")]
    MissingToken(String),

    /// Archive could not be unpacked
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The run completed with a conclusion other than `success`
    #[error("workflow run {run_id} concluded with '{conclusion}'")]
    UnsuccessfulConclusion {
        /// The run that failed
        run_id: u64,
        /// The conclusion reported by GitHub
        conclusion: String,
    },

    /// The run has no conclusion to verify (still running with waiting disabled,
    /// or `completed` without a conclusion)
    #[error("workflow run {run_id} has no conclusion (status: {status})")]
    MissingConclusion {
        /// The run being verified
        run_id: u64,
        /// Status reported alongside the missing conclusion
        status: String,
    },

    /// The run has no non-expired artifacts
    #[error("no non-expired artifacts found for workflow run {run_id}")]
    NoArtifacts {
        /// The run that was listed
        run_id: u64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transport-level errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout, or body streaming failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status {
        /// The HTTP status code
        status: u16,
        /// The requested URL
        url: String,
    },

    /// The response body did not match the expected shape
    #[error("failed to decode response from {url}: {reason}")]
    Decode {
        /// The requested URL
        url: String,
        /// Decoder message
        reason: String,
    },
}

/// Archive extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The archive is not a readable zip file
    #[error("failed to read archive {archive}: {reason}")]
    Corrupt {
        /// The downloaded archive
        archive: PathBuf,
        /// The reason reading failed
        reason: String,
    },

    /// A path could not be decomposed (no file name, no parent)
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },

    /// The caller went away while the archive was being unpacked
    #[error("extraction of {archive} cancelled")]
    Cancelled {
        /// The archive being unpacked
        archive: PathBuf,
    },

    /// No free destination name could be found
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The contested destination
        path: PathBuf,
        /// The reason resolution failed
        reason: String,
    },
}

/// Map errors to process exit codes and stable identifiers
pub trait ToExitCode {
    /// Process exit code for this error
    fn exit_code(&self) -> i32;

    /// Machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> i32 {
        // Every fatal kind shares exit code 1; callers distinguish via error_code().
        1
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Transport(e) => match e {
                TransportError::Network(_) => "network_error",
                TransportError::Status { .. } => "http_status",
                TransportError::Decode { .. } => "decode_error",
            },
            Error::Timeout { .. } => "timeout",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config { .. } => "config_error",
            Error::MissingToken(_) => "missing_token",
            Error::Extraction(e) => match e {
                ExtractionError::Corrupt { .. } => "extraction_failed",
                ExtractionError::InvalidPath { .. } => "invalid_path",
                ExtractionError::Cancelled { .. } => "extraction_cancelled",
                ExtractionError::FileCollision { .. } => "file_collision",
            },
            Error::UnsuccessfulConclusion { .. } => "unsuccessful_conclusion",
            Error::MissingConclusion { .. } => "missing_conclusion",
            Error::NoArtifacts { .. } => "no_artifacts",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}

impl Error {
    /// Whether this error came from the HTTP layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
