//! Utility functions for file operations and path manipulation

use crate::config::WRAPPER_NAME;
use crate::error::{ExtractionError, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a free path for a file, appending `_1`, `_2`, ... before the extension
///
/// Returns `path` unchanged when nothing exists there yet.
///
/// # Examples
///
/// ```
/// use gh_artifact_dl::utils::unique_path;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/definitely-not-here-report.txt");
/// assert_eq!(unique_path(path).unwrap(), path);
/// // If the file existed this would be /tmp/definitely-not-here-report_1.txt
/// ```
pub fn unique_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        ExtractionError::InvalidPath {
            path: path.to_path_buf(),
            reason: "cannot extract file stem".to_string(),
        }
    })?;

    let extension = path.extension().and_then(|e| e.to_str());

    let parent = path.parent().ok_or_else(|| ExtractionError::InvalidPath {
        path: path.to_path_buf(),
        reason: "cannot extract parent directory".to_string(),
    })?;

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let new_name = match extension {
            Some(ext) => format!("{}_{}.{}", stem, i, ext),
            None => format!("{}_{}", stem, i),
        };
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(ExtractionError::FileCollision {
        path: path.to_path_buf(),
        reason: format!(
            "could not find unique filename after {} attempts",
            MAX_RENAME_ATTEMPTS
        ),
    }
    .into())
}

/// Whether the file is the `artifact.zip` wrapper GitHub adds around single-zip artifacts
#[must_use]
pub fn is_wrapper(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == WRAPPER_NAME)
}

/// Move a file, falling back to copy + remove when rename crosses filesystems
///
/// An existing file at `dest` is replaced.
pub fn move_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            std::fs::copy(src, dest).map_err(|_| rename_err)?;
            std::fs::remove_file(src)
        }
    }
}

/// Whether `dir` exists and contains at least one entry
pub fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
