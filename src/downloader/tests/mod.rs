use super::*;
use crate::test_helpers::{FakeClock, RecordingNotifier, config_for, run_json, zip_bytes};
use serde_json::json;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};


const RUN_PATH: &str = "/repos/acme/app/actions/runs/123";
const ARTIFACTS_PATH: &str = "/repos/acme/app/actions/runs/123/artifacts";

struct Harness {
    server: MockServer,
    clock: Arc<FakeClock>,
    notifier: Arc<RecordingNotifier>,
    output: TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            clock: Arc::new(FakeClock::new()),
            notifier: Arc::new(RecordingNotifier::default()),
            output: tempdir().unwrap(),
        }
    }

    fn out_dir(&self) -> PathBuf {
        self.output.path().join("artifacts-123")
    }

    fn downloader(&self, flatten: bool) -> ArtifactDownloader {
        let mut config = config_for(&self.server);
        config.output.dir = Some(self.out_dir());
        config.output.flatten = flatten;
        config.wait.poll_interval = std::time::Duration::from_secs(10);
        config.wait.timeout = std::time::Duration::from_secs(60);
        self.downloader_with(config)
    }

    fn downloader_with(&self, config: Config) -> ArtifactDownloader {
        ArtifactDownloader::with_clock(
            config,
            "test-token",
            self.notifier.clone(),
            self.clock.clone(),
        )
        .unwrap()
    }

    async fn mount_run(&self, status: &str, conclusion: Option<&str>) {
        Mock::given(method("GET"))
            .and(path(RUN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json(status, conclusion)))
            .mount(&self.server)
            .await;
    }

    /// Serve `artifacts` as (name, zip entries) pairs and mount their downloads
    async fn mount_artifacts(&self, artifacts: &[(&str, &[(&str, &[u8])])]) {
        let mut listing = Vec::new();
        for (i, (name, files)) in artifacts.iter().enumerate() {
            let route = format!("/download/{}", name);
            Mock::given(method("GET"))
                .and(path(route.clone()))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(files)))
                .mount(&self.server)
                .await;
            listing.push(json!({
                "id": i + 1,
                "name": name,
                "archive_download_url": format!("{}{}", self.server.uri(), route),
                "expired": false,
                "size_in_bytes": 100
            }));
        }
        self.mount_listing(json!({ "total_count": listing.len(), "artifacts": listing }))
            .await;
    }

    async fn mount_listing(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

fn target() -> RunTarget {
    RunTarget::new("acme/app", 123).unwrap()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut entries: Vec<_> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .map(|e| {
            e.unwrap()
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    entries.sort();
    entries
}

#[tokio::test]
async fn new_rejects_invalid_config() {
    let mut config = Config::default();
    config.wait.poll_interval = std::time::Duration::ZERO;

    let result = ArtifactDownloader::new(config, "t", Arc::new(crate::notify::NoOpNotifier));

    assert!(matches!(result, Err(Error::Config { .. })));
}
