use crate::error::{Error, ExtractionError, ToExitCode};
use crate::extraction::*;
use crate::test_helpers::{client_for, zip_bytes};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn serve(server: &MockServer, route: &str, body: Vec<u8>) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

fn names(files: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn dir_listing(dir: &std::path::Path) -> Vec<String> {
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

// ---------------------------------------------------------------------------
// fetch_and_extract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn flatten_places_files_at_destination_root() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/dl/logs",
        zip_bytes(&[
            ("run.log", b"log line"),
            ("reports/", b""),
            ("reports/summary.txt", b"ok"),
            ("artifact.zip", b"wrapper"),
        ]),
    )
    .await;
    let dest = TempDir::new().unwrap();

    let files = fetch_and_extract(&client_for(&server), &url, dest.path(), true)
        .await
        .unwrap();

    assert_eq!(names(&files), vec!["run.log", "summary.txt"]);
    assert_eq!(dir_listing(dest.path()), vec!["run.log", "summary.txt"]);
}

#[tokio::test]
async fn no_flatten_preserves_structure() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/dl/logs",
        zip_bytes(&[
            ("run.log", b"log line"),
            ("reports/summary.txt", b"ok"),
            ("artifact.zip", b"wrapper"),
        ]),
    )
    .await;
    let dest = TempDir::new().unwrap();
    let artifact_dir = dest.path().join("logs");

    let files = fetch_and_extract(&client_for(&server), &url, &artifact_dir, false)
        .await
        .unwrap();

    assert_eq!(
        files,
        vec![artifact_dir.join("reports/summary.txt"), artifact_dir.join("run.log")]
    );
    assert_eq!(
        dir_listing(dest.path()),
        vec!["logs", "logs/reports", "logs/reports/summary.txt", "logs/run.log"]
    );
}

#[tokio::test]
async fn repeated_flatten_renames_instead_of_overwriting() {
    let server = MockServer::start().await;
    let first = serve(&server, "/dl/a", zip_bytes(&[("out.txt", b"first")])).await;
    let second = serve(&server, "/dl/b", zip_bytes(&[("out.txt", b"second")])).await;
    let dest = TempDir::new().unwrap();
    let client = client_for(&server);

    fetch_and_extract(&client, &first, dest.path(), true)
        .await
        .unwrap();
    let files = fetch_and_extract(&client, &second, dest.path(), true)
        .await
        .unwrap();

    assert_eq!(files, vec![dest.path().join("out_1.txt")]);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("out.txt")).unwrap(),
        "first"
    );
    assert_eq!(
        std::fs::read_to_string(dest.path().join("out_1.txt")).unwrap(),
        "second"
    );
}

#[tokio::test]
async fn empty_download_yields_no_files() {
    let server = MockServer::start().await;
    let url = serve(&server, "/dl/empty", Vec::new()).await;
    let dest = TempDir::new().unwrap();

    let files = fetch_and_extract(&client_for(&server), &url, dest.path(), true)
        .await
        .unwrap();

    assert!(files.is_empty());
    assert!(dir_listing(dest.path()).is_empty());
}

#[tokio::test]
async fn corrupt_archive_is_extraction_error() {
    let server = MockServer::start().await;
    let url = serve(&server, "/dl/bad", b"PK\x03\x04 definitely not a zip".to_vec()).await;
    let dest = TempDir::new().unwrap();

    let err = fetch_and_extract(&client_for(&server), &url, dest.path(), true)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::Corrupt { .. })
    ));
    assert!(dir_listing(dest.path()).is_empty());
}

#[tokio::test]
async fn download_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dest = TempDir::new().unwrap();
    let url = format!("{}/dl/missing", server.uri());

    let err = fetch_and_extract(&client_for(&server), &url, dest.path(), true)
        .await
        .unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn destination_is_created_when_missing() {
    let server = MockServer::start().await;
    let url = serve(&server, "/dl/a", zip_bytes(&[("a.txt", b"a")])).await;
    let root = TempDir::new().unwrap();
    let dest = root.path().join("deep/new/dir");

    let files = fetch_and_extract(&client_for(&server), &url, &dest, true)
        .await
        .unwrap();

    assert_eq!(files, vec![dest.join("a.txt")]);
}

#[tokio::test]
async fn checksum_mismatch_is_extraction_error() {
    let server = MockServer::start().await;
    let mut archive = zip_bytes(&[("run.log", b"log line payload")]);
    let offset = archive
        .windows(b"payload".len())
        .position(|w| w == b"payload")
        .unwrap();
    archive[offset] ^= 0xff;
    let url = serve(&server, "/dl/flipped", archive).await;
    let dest = TempDir::new().unwrap();

    let err = fetch_and_extract(&client_for(&server), &url, dest.path(), true)
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Extraction(ExtractionError::Corrupt { .. })),
        "got {err:?}"
    );
    assert_eq!(err.error_code(), "extraction_failed");
    assert!(dir_listing(dest.path()).is_empty());
}

// ---------------------------------------------------------------------------
// Temporary file cleanup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn temporary_files_are_removed_on_every_exit_path() {
    let server = MockServer::start().await;
    let good = serve(&server, "/dl/good", zip_bytes(&[("a.txt", b"a")])).await;
    let bad = serve(&server, "/dl/bad", b"not a zip at all".to_vec()).await;
    let empty = serve(&server, "/dl/empty", Vec::new()).await;
    Mock::given(method("GET"))
        .and(path("/dl/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let missing = format!("{}/dl/missing", server.uri());

    let temp_root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let client = client_for(&server);

    let files = fetch_and_extract_in(&client, &good, dest.path(), true, temp_root.path())
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert!(
        fetch_and_extract_in(&client, &bad, dest.path(), true, temp_root.path())
            .await
            .is_err()
    );
    assert!(
        fetch_and_extract_in(&client, &empty, dest.path(), false, temp_root.path())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        fetch_and_extract_in(&client, &missing, dest.path(), true, temp_root.path())
            .await
            .is_err()
    );

    assert!(
        dir_listing(temp_root.path()).is_empty(),
        "leftover temporary entries: {:?}",
        dir_listing(temp_root.path())
    );
}
