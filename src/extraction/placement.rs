use crate::error::Result;
use crate::utils::{is_wrapper, move_file, unique_path};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Regular files under `root`, sorted by name at each level
fn regular_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Move every file under `staging` directly into `dest`, discarding directories
///
/// Wrapper files are left behind. A name already taken in `dest` gets a `_N`
/// suffix, so nothing is overwritten.
pub fn flatten_into(staging: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dest)?;

    let mut placed = Vec::new();
    for item in regular_files(staging)? {
        if is_wrapper(&item) {
            info!(file = ?item.file_name(), "skipping artifact wrapper");
            continue;
        }

        let Some(name) = item.file_name() else {
            continue;
        };
        let target = unique_path(&dest.join(name))?;
        move_file(&item, &target)?;

        if target.file_name() != Some(name) {
            info!(from = ?name, to = ?target.file_name(), "renamed to avoid conflict");
        }
        debug!(?target, "extracted");
        placed.push(target);
    }

    Ok(placed)
}

/// Move every file under `staging` into `dest`, keeping relative paths
///
/// Wrapper files are left behind. Existing files at the same relative path are
/// replaced.
pub fn place_tree(staging: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dest)?;

    let mut placed = Vec::new();
    for item in regular_files(staging)? {
        if is_wrapper(&item) {
            info!(file = ?item.file_name(), "skipping artifact wrapper");
            continue;
        }

        let Ok(relative) = item.strip_prefix(staging) else {
            continue;
        };
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        move_file(&item, &target)?;
        debug!(?target, "extracted");
        placed.push(target);
    }

    Ok(placed)
}
