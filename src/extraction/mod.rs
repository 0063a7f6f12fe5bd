//! Artifact archive download and extraction
//!
//! An artifact zip is streamed to a private temporary file, unpacked into a
//! private staging directory, and only then moved into the caller's directory,
//! either flattened (base names only, `_N` suffixes on conflicts) or with its
//! internal structure preserved. The `artifact.zip` wrapper GitHub adds around
//! single-zip artifacts never reaches the destination.
//!
//! Both temporary resources are RAII guards (`tempfile`), so they are removed on
//! every exit path. Dropping the future mid-extraction (interrupt) stops the
//! blocking unpack at the next entry.

mod placement;
mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use placement::{flatten_into, place_tree};
pub use zip::ZipExtractor;

use crate::client::GitHubClient;
use crate::error::{ExtractionError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::spawn_blocking;
use tracing::{info, warn};

/// Name prefix of the temporary archive and staging directory
const TEMP_PREFIX: &str = "gh-artifact-";

/// Raises the flag when the awaiting future is dropped, so an abandoned
/// extraction on the blocking pool stops at the next entry and cleans up
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Download the archive at `url` and unpack it into `dest`
///
/// # Arguments
/// * `client` - Authenticated client used for the download
/// * `url` - Archive locator (`archive_download_url`)
/// * `dest` - Caller-visible destination directory, created if missing
/// * `flatten` - Discard the archive's directory structure
///
/// # Returns
/// The files placed under `dest`. A zero-byte download yields an empty list.
///
/// # Errors
/// Transport errors from the download, [`ExtractionError::Corrupt`] for an
/// unreadable archive, I/O errors while placing files.
pub async fn fetch_and_extract(
    client: &GitHubClient,
    url: &str,
    dest: &Path,
    flatten: bool,
) -> Result<Vec<PathBuf>> {
    fetch_and_extract_in(client, url, dest, flatten, &std::env::temp_dir()).await
}

/// [`fetch_and_extract`] with temporary files created under `temp_root`
pub(crate) async fn fetch_and_extract_in(
    client: &GitHubClient,
    url: &str,
    dest: &Path,
    flatten: bool,
    temp_root: &Path,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dest).await?;

    let download = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".zip")
        .tempfile_in(temp_root)?;

    let bytes_downloaded = {
        let mut file = tokio::fs::File::from_std(download.reopen()?);
        client.download_to(url, &mut file).await?
    };

    info!(
        bytes = bytes_downloaded,
        "downloaded {:.2} MB",
        bytes_downloaded as f64 / (1024.0 * 1024.0)
    );

    if bytes_downloaded == 0 {
        warn!(url, "downloaded file is empty");
        return Ok(Vec::new());
    }

    info!("extracting");
    let dest_owned = dest.to_path_buf();
    let archive_path = download.path().to_path_buf();
    let staging_root = temp_root.to_path_buf();
    let cancelled = Arc::new(AtomicBool::new(false));
    let _cancel_on_drop = CancelOnDrop(Arc::clone(&cancelled));
    let files = spawn_blocking(move || -> Result<Vec<PathBuf>> {
        let staging = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir_in(&staging_root)?;
        ZipExtractor::extract_all_until(download.path(), staging.path(), &cancelled)?;

        if flatten {
            flatten_into(staging.path(), &dest_owned)
        } else {
            place_tree(staging.path(), &dest_owned)
        }
        // staging and download are dropped (and deleted) here
    })
    .await
    .map_err(|e| ExtractionError::Corrupt {
        archive: archive_path,
        reason: format!("extraction task panicked: {}", e),
    })??;

    info!(count = files.len(), "successfully extracted {} files", files.len());
    Ok(files)
}
