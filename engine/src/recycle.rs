//! Recycle bin for overwritten destination content.
//!
//! Anything about to be overwritten at the destination is moved into a
//! per-run holding directory first, named with the run's start timestamp.
//! The bin mirrors destination-relative paths, so an overwritten
//! `root/docs/a.txt` ends up at `root/<bin>/docs/a.txt`. Preservation is a
//! rename, not a copy; if it fails, the caller must abort the overwrite.

use crate::error::EngineError;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-run holding area for overwritten destination content.
#[derive(Debug)]
pub struct RecycleBin {
    destination_root: PathBuf,
    path: PathBuf,
}

impl RecycleBin {
    /// Plan a recycle bin under `destination_root`, named with the run's
    /// start timestamp. Nothing is created on disk until the first
    /// `preserve` call.
    pub fn new(destination_root: &Path, started_at: DateTime<Local>) -> Self {
        let name = format!("~recycle_{}", started_at.format("%Y%m%d_%H%M%S"));
        RecycleBin {
            destination_root: destination_root.to_path_buf(),
            path: destination_root.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move `target` into the bin, recreating its destination-relative path.
    ///
    /// Called immediately before any destructive overwrite of `target`.
    /// The move is a single rename; on failure (permissions, cross-device)
    /// the overwrite must not proceed, so data that could not be preserved
    /// is never destroyed.
    pub fn preserve(&self, target: &Path) -> Result<(), EngineError> {
        let relative = target.strip_prefix(&self.destination_root).map_err(|_| {
            EngineError::PreservationFailed {
                path: target.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "target is outside the destination root",
                ),
            }
        })?;

        let preserved = self.path.join(relative);
        if let Some(parent) = preserved.parent() {
            fs::create_dir_all(parent).map_err(|e| EngineError::PreservationFailed {
                path: target.to_path_buf(),
                source: e,
            })?;
        }

        fs::rename(target, &preserved).map_err(|e| EngineError::PreservationFailed {
            path: target.to_path_buf(),
            source: e,
        })
    }

    /// Remove the bin if it ended the run empty; report it otherwise.
    ///
    /// Returns the bin path if it was retained (received at least one
    /// entry), None if it never came into existence or was removed.
    pub fn finalize(&self) -> Result<Option<PathBuf>, EngineError> {
        let mut entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EngineError::from_io(&self.path, e)),
        };

        if entries.next().is_none() {
            fs::remove_dir(&self.path).map_err(|e| EngineError::from_io(&self.path, e))?;
            Ok(None)
        } else {
            Ok(Some(self.path.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bin_for(root: &Path) -> RecycleBin {
        let started_at = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        RecycleBin::new(root, started_at)
    }

    #[test]
    fn test_bin_name_carries_timestamp() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bin = bin_for(temp_dir.path());
        assert_eq!(
            bin.path().file_name().and_then(|n| n.to_str()),
            Some("~recycle_20240301_123045")
        );
    }

    #[test]
    fn test_preserve_moves_file_keeping_relative_path() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let target = root.join("docs").join("a.txt");
        fs::create_dir_all(target.parent().unwrap()).expect("Failed to create dirs");
        fs::write(&target, b"old content").expect("Failed to write target");

        let bin = bin_for(root);
        bin.preserve(&target).expect("Failed to preserve");

        assert!(!target.exists(), "target should have been moved away");
        let preserved = bin.path().join("docs").join("a.txt");
        let content = fs::read_to_string(&preserved).expect("Failed to read preserved file");
        assert_eq!(content, "old content");
    }

    #[test]
    fn test_preserve_moves_whole_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let target = root.join("mirror");
        fs::create_dir_all(target.join("sub")).expect("Failed to create dirs");
        fs::write(target.join("sub").join("x.txt"), b"x").expect("Failed to write file");

        let bin = bin_for(root);
        bin.preserve(&target).expect("Failed to preserve");

        assert!(!target.exists());
        assert!(bin.path().join("mirror").join("sub").join("x.txt").exists());
    }

    #[test]
    fn test_preserve_rejects_target_outside_root() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let other = tempfile::tempdir().expect("Failed to create temp dir");
        let stray = other.path().join("stray.txt");
        fs::write(&stray, b"x").expect("Failed to write file");

        let bin = bin_for(temp_dir.path());
        let result = bin.preserve(&stray);
        assert!(matches!(result, Err(EngineError::PreservationFailed { .. })));
        assert!(stray.exists(), "a failed preserve must leave the target alone");
    }

    #[test]
    fn test_finalize_removes_untouched_bin() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bin = bin_for(temp_dir.path());

        // Never used: nothing on disk, nothing to report
        assert!(bin.finalize().expect("Finalize failed").is_none());
        assert!(!bin.path().exists());

        // Created but empty: removed
        fs::create_dir_all(bin.path()).expect("Failed to create bin dir");
        assert!(bin.finalize().expect("Finalize failed").is_none());
        assert!(!bin.path().exists());
    }

    #[test]
    fn test_finalize_retains_nonempty_bin() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let target = root.join("a.txt");
        fs::write(&target, b"old").expect("Failed to write target");

        let bin = bin_for(root);
        bin.preserve(&target).expect("Failed to preserve");

        let retained = bin.finalize().expect("Finalize failed");
        assert_eq!(retained.as_deref(), Some(bin.path()));
        assert!(bin.path().exists());
    }
}
