//! Archive extractor.

use crate::error::{Result, WatchError};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Decompress every entry of `archive` into `target_dir`, overwriting files
/// with the same name. Returns the paths of the files written.
///
/// A missing archive is reported as `ArchiveNotFound` rather than a generic
/// I/O error. Entries whose names would escape `target_dir` make the archive
/// count as corrupt.
pub fn extract_archive(archive: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    if !archive.is_file() {
        return Err(WatchError::ArchiveNotFound {
            path: archive.to_path_buf(),
        });
    }

    let file = File::open(archive).map_err(|e| WatchError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| corrupt(archive, e))?;

    std::fs::create_dir_all(target_dir).map_err(|e| WatchError::io(target_dir, e))?;

    let mut written = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| corrupt(archive, e))?;

        let relative = entry.enclosed_name().ok_or_else(|| WatchError::CorruptArchive {
            path: archive.to_path_buf(),
            reason: format!("entry '{}' escapes the extraction directory", entry.name()),
        })?;
        let out_path = target_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| WatchError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WatchError::io(parent, e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| WatchError::io(&out_path, e))?;
        let bytes = std::io::copy(&mut entry, &mut out).map_err(|e| WatchError::io(&out_path, e))?;

        debug!(path = %out_path.display(), bytes, "extracted entry");
        written.push(out_path);
    }

    info!(
        archive = %archive.display(),
        files = written.len(),
        "archive extracted"
    );
    Ok(written)
}

fn corrupt(archive: &Path, err: zip::result::ZipError) -> WatchError {
    WatchError::CorruptArchive {
        path: archive.to_path_buf(),
        reason: err.to_string(),
    }
}
