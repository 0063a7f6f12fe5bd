//! # gh-artifact-dl
//!
//! Download and unpack the artifacts of a GitHub Actions workflow run.
//!
//! Given a repository and run id, the downloader optionally waits for the run
//! to complete, refuses to continue unless it concluded with `success`, lists
//! the run's non-expired artifacts, and streams each artifact zip to a
//! temporary file before unpacking it. By default every file lands directly in
//! the output directory (conflicting names get `_1`, `_2`, ... suffixes); with
//! flattening off each artifact gets its own subdirectory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gh_artifact_dl::{ArtifactDownloader, Config, NoOpNotifier, RunTarget};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ArtifactDownloader::new(
//!         Config::default(),
//!         &std::env::var("GITHUB_TOKEN")?,
//!         Arc::new(NoOpNotifier),
//!     )?;
//!
//!     let summary = downloader.run(&RunTarget::new("acme/app", 123)?).await?;
//!     println!("{} files in {}", summary.total_files(), summary.output_dir.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Artifact listing
pub mod artifacts;
/// Command-line parsing
pub mod cli;
/// GitHub REST client
pub mod client;
/// Configuration types
pub mod config;
/// Run orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Archive download and extraction
pub mod extraction;
/// Desktop notifications
pub mod notify;
/// Run status polling
pub mod poller;
/// Logging setup
pub mod telemetry;
/// Token discovery
pub mod token;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use client::GitHubClient;
pub use config::Config;
pub use downloader::ArtifactDownloader;
pub use error::{Error, ExtractionError, Result, ToExitCode, TransportError};
pub use notify::{DesktopNotifier, NoOpNotifier, NotificationSink, select_notifier};
pub use poller::{Clock, SystemClock};
pub use token::{TokenChain, TokenProvider};
pub use types::{
    ArtifactDescriptor, Conclusion, DownloadSummary, RunDescriptor, RunStatus, RunTarget, Stage,
};

/// Wait for an interrupt or termination signal
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Handler registration may fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Wait for an interrupt or termination signal
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
