//! Best-effort desktop notifications
//!
//! The [`NotificationSink`] trait has two implementations:
//!
//! - [`DesktopNotifier`]: runs the `notify-send` binary found in PATH
//! - [`NoOpNotifier`]: used when notifications are disabled or unavailable
//!
//! Sinks never return errors. A failed notification is logged and forgotten.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How long `notify-send` may run before it is abandoned
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for run outcome notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification; failures are logged, never propagated
    async fn notify(&self, title: &str, message: &str);

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Sink that discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl NotificationSink for NoOpNotifier {
    async fn notify(&self, title: &str, _message: &str) {
        debug!(title, "notification skipped");
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Sink backed by the freedesktop `notify-send` binary
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    binary_path: PathBuf,
}

impl DesktopNotifier {
    /// Create a notifier that runs the given binary
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find `notify-send` in PATH
    pub fn from_path() -> Option<Self> {
        which::which("notify-send").ok().map(Self::new)
    }
}

#[async_trait]
impl NotificationSink for DesktopNotifier {
    async fn notify(&self, title: &str, message: &str) {
        let result = tokio::time::timeout(
            NOTIFY_TIMEOUT,
            Command::new(&self.binary_path)
                .arg(title)
                .arg(message)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) if output.status.success() => {
                info!(title, "desktop notification sent");
            }
            Ok(Ok(output)) => {
                warn!(
                    binary = ?self.binary_path,
                    code = ?output.status.code(),
                    "failed to send desktop notification"
                );
            }
            Ok(Err(e)) => {
                warn!(binary = ?self.binary_path, error = %e, "failed to run notifier");
            }
            Err(_) => {
                warn!(binary = ?self.binary_path, timeout = ?NOTIFY_TIMEOUT, "notifier timed out");
            }
        }
    }

    fn name(&self) -> &'static str {
        "notify-send"
    }
}

/// Pick the notification sink for this process
///
/// Returns the desktop notifier when `enabled` and `notify-send` is installed,
/// otherwise the no-op sink.
pub fn select_notifier(enabled: bool) -> Arc<dyn NotificationSink> {
    if !enabled {
        return Arc::new(NoOpNotifier);
    }
    match DesktopNotifier::from_path() {
        Some(notifier) => {
            debug!(binary = ?notifier.binary_path, "using desktop notifications");
            Arc::new(notifier)
        }
        None => {
            debug!("notify-send not found, desktop notifications disabled");
            Arc::new(NoOpNotifier)
        }
    }
}
