//! Archive fixtures and test doubles

use async_trait::async_trait;
use gh_artifact_dl::{Clock, NotificationSink};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Entries of the "logs" artifact: a log plus the wrapper that must be dropped
pub const LOGS_ARTIFACT: &[(&str, &[u8])] = &[
    ("run.log", b"2024-01-01 build started\n2024-01-01 build finished\n"),
    ("artifact.zip", b"PK wrapper"),
];

/// Entries of the "build" artifact
pub const BUILD_ARTIFACT: &[(&str, &[u8])] = &[("app.bin", b"\x7fELF\x02\x01\x01")];

/// Build an in-memory zip with the given (name, content) entries
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Sorted relative paths of everything under `dir`, `/`-separated
pub fn tree(dir: &Path) -> Vec<String> {
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

/// Clock that never blocks and counts sleeps
pub struct CountingClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<u32>,
}

impl CountingClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(0),
        }
    }

    pub fn sleeps(&self) -> u32 {
        *self.sleeps.lock().unwrap()
    }
}

#[async_trait]
impl Clock for CountingClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        *self.sleeps.lock().unwrap() += 1;
    }
}

/// Notification sink that records titles
#[derive(Default)]
pub struct CapturedNotifications {
    titles: Mutex<Vec<String>>,
}

impl CapturedNotifications {
    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for CapturedNotifications {
    async fn notify(&self, title: &str, _message: &str) {
        self.titles.lock().unwrap().push(title.to_string());
    }

    fn name(&self) -> &'static str {
        "captured"
    }
}
