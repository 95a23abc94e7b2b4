//! Low-level filesystem operations.
//!
//! This module provides the primitives the orchestrator builds on:
//! - Copying files with modification-time preservation
//! - Creating parent directories recursively
//! - Measuring file and directory sizes
//! - Mapping a source path to its mirrored destination

use crate::error::EngineError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy a file from source to destination, preserving the modification time.
///
/// The parent directory of the destination is created if needed. The
/// destination mtime mirrors the source so that change detection treats the
/// pair as up to date on the next run.
///
/// # Returns
/// Number of bytes copied
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<u64, EngineError> {
    ensure_parent_dir_exists(dst)?;

    let src_mtime = fs::metadata(src)
        .and_then(|m| m.modified())
        .map_err(|e| EngineError::from_io(src, e))?;

    let bytes_copied = fs::copy(src, dst).map_err(|e| EngineError::from_io(dst, e))?;

    filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(src_mtime))
        .map_err(|e| EngineError::from_io(dst, e))?;

    Ok(bytes_copied)
}

/// Ensure the parent directory of a path exists, creating it if necessary.
pub fn ensure_parent_dir_exists(path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| EngineError::from_io(parent, e))?;
        }
    }
    Ok(())
}

/// Recursive size of a directory tree: the sum of all contained file sizes.
///
/// Unreadable entries are counted as zero; sizing is an estimate for
/// progress reporting, and real errors resurface when the item is copied.
pub fn directory_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Size of one source path: file size for files, recursive size for
/// directories, zero if the path does not exist.
pub fn source_size(path: &Path) -> u64 {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        Ok(metadata) if metadata.is_dir() => directory_size(path),
        _ => 0,
    }
}

/// Map a source path to its destination under the root.
///
/// The destination mirrors the source's path relative to its parent
/// directory, i.e. the final path component lands directly under the root.
/// The archive suffix for compressed directories is appended by the caller.
pub fn destination_for(source: &Path, destination_root: &Path) -> Result<PathBuf, EngineError> {
    let name = source.file_name().ok_or_else(|| EngineError::OsFailure {
        path: source.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            "source path has no final component",
        ),
    })?;
    Ok(destination_root.join(name))
}
