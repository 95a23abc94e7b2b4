//! Modification-time based change detection.
//!
//! The filesystem is the source of truth: decisions are computed fresh on
//! every run by comparing modification timestamps, with no manifest or
//! database on the side. Equal timestamps count as "not newer", so ties
//! never trigger a copy.

use crate::error::EngineError;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Decide whether a source path needs to be backed up to `destination`.
///
/// - Destination missing: always update.
/// - File vs file: update iff the source is strictly newer.
/// - Directory vs archive file (compressed mode): update iff any file
///   anywhere inside the source tree is strictly newer than the archive.
/// - Directory vs mirrored directory: update iff any source file is missing
///   at the destination or strictly newer than its counterpart. The scan
///   short-circuits on the first stale file; files deleted from the source
///   are not detected, so the destination keeps orphans.
pub fn needs_update(source: &Path, destination: &Path) -> Result<bool, EngineError> {
    if !destination.exists() {
        return Ok(true);
    }

    if source.is_file() && destination.is_file() {
        return Ok(mtime(source)? > mtime(destination)?);
    }

    if source.is_dir() {
        if destination.is_file() {
            return archive_stale(source, destination);
        }
        return mirror_stale(source, destination);
    }

    Ok(false)
}

/// True iff any file under `source_dir` is strictly newer than the archive.
fn archive_stale(source_dir: &Path, archive: &Path) -> Result<bool, EngineError> {
    let archive_mtime = mtime(archive)?;
    for entry in WalkDir::new(source_dir).follow_links(false) {
        let entry = entry.map_err(walk_error(source_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if mtime(entry.path())? > archive_mtime {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True iff any source file is missing from the mirror or newer than its
/// mirrored counterpart. Short-circuits on the first stale file.
fn mirror_stale(source_dir: &Path, destination_dir: &Path) -> Result<bool, EngineError> {
    for entry in WalkDir::new(source_dir).follow_links(false) {
        let entry = entry.map_err(walk_error(source_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(source_dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let mirrored = destination_dir.join(relative);

        if !mirrored.exists() {
            return Ok(true);
        }
        if mtime(entry.path())? > mtime(&mirrored)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn mtime(path: &Path) -> Result<SystemTime, EngineError> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| EngineError::from_io(path, e))
}

fn walk_error(root: &Path) -> impl Fn(walkdir::Error) -> EngineError + '_ {
    move |err| {
        let path = err
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| root.to_path_buf());
        EngineError::from_io(&path, err.into())
    }
}
