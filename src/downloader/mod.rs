//! Run orchestration
//!
//! [`ArtifactDownloader`] drives one workflow run through its stages:
//!
//! ```text
//! Fetching -> (Waiting) -> Verifying -> Listing -> Downloading -> Done
//! ```
//!
//! Any stage may end in `Failed`. Stages run strictly in sequence, one HTTP
//! request or archive at a time.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::artifacts::list_artifacts;
use crate::client::GitHubClient;
use crate::config::Config;
use crate::error::{Error, Result, ToExitCode};
use crate::extraction::fetch_and_extract;
use crate::notify::NotificationSink;
use crate::poller::{Clock, SystemClock, wait_for_completion};
use crate::types::{ArtifactDescriptor, DownloadSummary, RunDescriptor, RunTarget, Stage};
use crate::utils::dir_has_entries;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Downloads the artifacts of a single workflow run
///
/// Built once in `main` and passed the collaborators it needs; holds no global
/// state.
pub struct ArtifactDownloader {
    config: Config,
    client: GitHubClient,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl ArtifactDownloader {
    /// Create a downloader using the wall clock
    ///
    /// # Errors
    /// [`Error::Config`] if the configuration is invalid, or a transport error if
    /// the HTTP client cannot be built.
    pub fn new(config: Config, token: &str, notifier: Arc<dyn NotificationSink>) -> Result<Self> {
        Self::with_clock(config, token, notifier, Arc::new(SystemClock))
    }

    /// Create a downloader with an explicit clock
    pub fn with_clock(
        config: Config,
        token: &str,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let client = GitHubClient::new(&config, token)?;
        Ok(Self {
            config,
            client,
            notifier,
            clock,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch, verify, list and download every artifact of `target`
    ///
    /// Files extracted before a failing artifact are left on disk.
    ///
    /// # Errors
    /// The first error hit by any stage; see [`Error`] for the kinds.
    pub async fn run(&self, target: &RunTarget) -> Result<DownloadSummary> {
        let mut stage = Stage::Fetching;
        let result = self.run_stages(target, &mut stage).await;

        if let Err(e) = &result {
            error!(
                run = %target,
                stage = %stage,
                code = e.error_code(),
                error = %e,
                "run failed"
            );
            stage = Stage::Failed;
            info!(run = %target, stage = %stage, "stage");
        }

        result
    }

    async fn run_stages(&self, target: &RunTarget, stage: &mut Stage) -> Result<DownloadSummary> {
        enter(stage, Stage::Fetching, target);
        let mut run = self.client.get_run(target).await?;
        info!(
            "Workflow run #{} ({}) - Status: {}, Conclusion: {}",
            run.run_number,
            run.display_name(),
            run.status,
            run.conclusion.as_ref().map(|c| c.as_str()).unwrap_or("none")
        );

        if self.config.wait.enabled && !run.status.is_completed() {
            enter(stage, Stage::Waiting, target);
            run = wait_for_completion(
                &self.client,
                target,
                self.config.wait.poll_interval,
                self.config.wait.timeout,
                self.clock.as_ref(),
                self.notifier.as_ref(),
            )
            .await?;
        }

        enter(stage, Stage::Verifying, target);
        self.verify(&run).await?;

        enter(stage, Stage::Listing, target);
        let artifacts = list_artifacts(&self.client, target).await?;
        if artifacts.is_empty() {
            return Err(Error::NoArtifacts {
                run_id: target.run_id,
            });
        }

        enter(stage, Stage::Downloading, target);
        let summary = self.download_all(target, &artifacts).await?;

        enter(stage, Stage::Done, target);
        info!(
            output_dir = %summary.output_dir.display(),
            downloaded = summary.artifacts_downloaded,
            skipped = summary.artifacts_skipped,
            "All artifacts downloaded to {} ({} files total)",
            summary.output_dir.display(),
            summary.total_files()
        );
        Ok(summary)
    }

    /// Gate on the run conclusion, notifying either way
    async fn verify(&self, run: &RunDescriptor) -> Result<()> {
        let Some(conclusion) = &run.conclusion else {
            if run.status.is_completed() {
                error!(run_id = run.id, "workflow status is unknown");
            } else {
                error!(
                    run_id = run.id,
                    status = %run.status,
                    "workflow has not completed and waiting is disabled"
                );
            }
            return Err(Error::MissingConclusion {
                run_id: run.id,
                status: run.status.to_string(),
            });
        };

        if conclusion.is_success() {
            info!(run_id = run.id, "workflow completed successfully");
            self.notifier
                .notify(
                    "Workflow Succeeded",
                    &format!(
                        "Run #{}: {}\nReady to download artifacts",
                        run.run_number,
                        run.display_name()
                    ),
                )
                .await;
            return Ok(());
        }

        error!(run_id = run.id, conclusion = %conclusion, "workflow did not succeed");
        self.notifier
            .notify(
                "Workflow Failed",
                &format!(
                    "Run #{}: {}\nConclusion: {}",
                    run.run_number,
                    run.display_name(),
                    conclusion
                ),
            )
            .await;
        Err(Error::UnsuccessfulConclusion {
            run_id: run.id,
            conclusion: conclusion.to_string(),
        })
    }

    async fn download_all(
        &self,
        target: &RunTarget,
        artifacts: &[ArtifactDescriptor],
    ) -> Result<DownloadSummary> {
        let flatten = self.config.output.flatten;
        let mut summary = DownloadSummary {
            output_dir: self.config.output_dir_for(target.run_id),
            ..Default::default()
        };

        for artifact in artifacts {
            let dest = if flatten {
                summary.output_dir.clone()
            } else {
                summary.output_dir.join(&artifact.name)
            };

            if !flatten && already_populated(&dest) {
                warn!(
                    artifact = %artifact.name,
                    dir = %dest.display(),
                    "directory already exists and is not empty, skipping"
                );
                summary.artifacts_skipped += 1;
                continue;
            }

            info!(artifact = %artifact.name, dest = %dest.display(), "downloading artifact");
            let files =
                fetch_and_extract(&self.client, &artifact.archive_download_url, &dest, flatten)
                    .await
                    .inspect_err(|e| {
                        error!(artifact = %artifact.name, error = %e, "failed to download artifact");
                    })?;

            summary.artifacts_downloaded += 1;
            summary.files.extend(files);
        }

        Ok(summary)
    }
}

fn enter(stage: &mut Stage, next: Stage, target: &RunTarget) {
    *stage = next;
    info!(run = %target, stage = %next, "stage");
}

fn already_populated(dir: &Path) -> bool {
    dir.is_dir() && dir_has_entries(dir)
}
