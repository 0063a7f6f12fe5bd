//! Run status polling
//!
//! Re-queries a workflow run at a fixed interval until it reports `completed`
//! or the wait budget is spent. There is no backoff. Transport errors end the
//! wait immediately.

use crate::client::GitHubClient;
use crate::error::{Error, Result};
use crate::notify::NotificationSink;
use crate::types::{RunDescriptor, RunTarget};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Source of time for the poll loop
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Format an elapsed duration as `XmYs`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Poll until the run completes
///
/// The first status check always happens before the timeout is evaluated, so a
/// run that is already complete is returned even with a zero timeout.
///
/// # Errors
/// - [`Error::Timeout`] once `timeout` has elapsed with the run still incomplete
///   (a timeout notification is sent first)
/// - Any transport error from the status request, unretried
pub async fn wait_for_completion(
    client: &GitHubClient,
    target: &RunTarget,
    poll_interval: Duration,
    timeout: Duration,
    clock: &dyn Clock,
    notifier: &dyn NotificationSink,
) -> Result<RunDescriptor> {
    let start = clock.now();

    loop {
        let run = client.get_run(target).await.inspect_err(|e| {
            error!(run_id = target.run_id, error = %e, "failed to fetch workflow status");
        })?;

        if run.status.is_completed() {
            info!(
                run_id = target.run_id,
                status = %run.status,
                conclusion = %run.conclusion.as_ref().map(|c| c.as_str()).unwrap_or("none"),
                "workflow completed"
            );
            return Ok(run);
        }

        let elapsed = clock.now().saturating_duration_since(start);
        info!(
            run_id = target.run_id,
            status = %run.status,
            "waiting for workflow to complete (elapsed: {})",
            format_elapsed(elapsed)
        );

        if elapsed >= timeout {
            error!(
                run_id = target.run_id,
                timeout_secs = timeout.as_secs(),
                "workflow did not complete in time"
            );
            notifier
                .notify(
                    "Workflow Timeout",
                    &format!(
                        "Workflow run {} did not complete within {} minutes",
                        target.run_id,
                        timeout.as_secs() / 60
                    ),
                )
                .await;
            return Err(Error::Timeout {
                run_id: target.run_id,
                timeout,
            });
        }

        clock.sleep(poll_interval).await;
    }
}
