use crate::error::{Error, ExtractionError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Number of entry names logged at debug level
const LOGGED_ENTRIES: usize = 10;

/// Archive extractor for ZIP files
pub struct ZipExtractor;

impl ZipExtractor {
    /// Extract a single ZIP entry to disk, creating directories as needed
    fn extract_zip_entry(
        mut file: zip::read::ZipFile,
        archive_path: &Path,
        dest_path: &Path,
    ) -> Result<Option<PathBuf>> {
        // enclosed_name rejects absolute paths and `..` traversal
        let file_path = match file.enclosed_name() {
            Some(path) => dest_path.join(path),
            None => {
                warn!(entry = %file.name(), "skipping entry with unsafe path");
                return Ok(None);
            }
        };

        if file.is_dir() {
            std::fs::create_dir_all(&file_path)?;
            return Ok(None);
        }

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = std::fs::File::create(&file_path)?;
        // bad CRC and truncated data surface as read errors of these kinds
        std::io::copy(&mut file, &mut outfile).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
                ExtractionError::Corrupt {
                    archive: archive_path.to_path_buf(),
                    reason: format!("failed to read ZIP entry {}: {}", file.name(), e),
                }
                .into()
            }
            _ => Error::Io(e),
        })?;

        Ok(Some(file_path))
    }

    /// Extract every entry of `archive_path` under `dest_path`
    ///
    /// Returns the regular files written, in archive order.
    ///
    /// # Errors
    /// [`ExtractionError::Corrupt`] when the archive or one of its entries cannot be
    /// read; I/O errors while writing propagate as-is.
    pub fn extract_all(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        Self::extract_all_until(archive_path, dest_path, &AtomicBool::new(false))
    }

    /// [`extract_all`](Self::extract_all), stopping before the next entry once
    /// `cancelled` is set
    ///
    /// # Errors
    /// As `extract_all`, plus [`ExtractionError::Cancelled`].
    pub fn extract_all_until(
        archive_path: &Path,
        dest_path: &Path,
        cancelled: &AtomicBool,
    ) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "attempting ZIP extraction");

        std::fs::create_dir_all(dest_path)?;

        let file = std::fs::File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractionError::Corrupt {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read ZIP archive: {}", e),
        })?;

        info!(entries = archive.len(), "zip contains {} entries", archive.len());
        debug!(
            first_entries = ?archive.file_names().take(LOGGED_ENTRIES).collect::<Vec<_>>(),
            "zip entries"
        );

        let mut extracted_files = Vec::new();
        for i in 0..archive.len() {
            if cancelled.load(Ordering::Relaxed) {
                warn!(?archive_path, extracted = extracted_files.len(), "extraction cancelled");
                return Err(ExtractionError::Cancelled {
                    archive: archive_path.to_path_buf(),
                }
                .into());
            }

            let entry = archive
                .by_index(i)
                .map_err(|e| ExtractionError::Corrupt {
                    archive: archive_path.to_path_buf(),
                    reason: format!("failed to read ZIP entry {}: {}", i, e),
                })?;

            if let Some(file_path) = Self::extract_zip_entry(entry, archive_path, dest_path)? {
                extracted_files.push(file_path);
            }
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "ZIP extraction successful"
        );

        Ok(extracted_files)
    }
}
