//! Shared test helpers: fake clock, recording notifier, zip and JSON fixtures.

use crate::client::GitHubClient;
use crate::config::Config;
use crate::notify::NotificationSink;
use crate::poller::Clock;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use wiremock::MockServer;

/// Clock whose `sleep` advances virtual time instantly and counts calls
pub(crate) struct FakeClock {
    start: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<u32>,
}

impl FakeClock {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(0),
        }
    }

    pub(crate) fn sleeps(&self) -> u32 {
        *self.sleeps.lock().unwrap()
    }

    pub(crate) fn slept(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
        *self.sleeps.lock().unwrap() += 1;
    }
}

/// Notifier that remembers every (title, message) pair
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub(crate) fn titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Config pointing at a mock server
pub(crate) fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.url = server.uri();
    config
}

/// Client pointing at a mock server
pub(crate) fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&config_for(server), "test-token").unwrap()
}

/// Workflow run payload for run 123
pub(crate) fn run_json(status: &str, conclusion: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": 123,
        "name": "CI",
        "run_number": 42,
        "status": status,
        "conclusion": conclusion,
        "html_url": "https://github.com/acme/app/actions/runs/123"
    })
}

/// Build a zip archive in memory with the given (name, content) entries
///
/// Names ending in `/` become directory entries.
pub(crate) fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ::zip::ZipWriter::new(&mut cursor);
        let options = ::zip::write::FileOptions::default()
            .compression_method(::zip::CompressionMethod::Stored);
        for (name, content) in files {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                std::io::Write::write_all(&mut writer, content).unwrap();
            }
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Write a zip archive to disk
pub(crate) fn write_zip(archive_path: &Path, files: &[(&str, &[u8])]) {
    std::fs::write(archive_path, zip_bytes(files)).unwrap();
}
