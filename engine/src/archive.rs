//! Deflate-compressed directory archives.
//!
//! A directory tree is bundled into one archive file. Entry names are the
//! paths relative to the archived directory, forward-slash separated; the
//! directory's own name is not part of any entry. Empty directories are not
//! recorded as explicit entries.

use crate::error::EngineError;
use crate::fs_ops;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build a deflate-compressed archive of `source_dir` at `destination`.
///
/// Overwrite-safe only if the caller already routed the old archive through
/// the recycle bin. On a mid-archive failure the partially written archive
/// is left in place and the error is surfaced; there is no rollback, and a
/// re-run rebuilds the archive.
pub fn build_archive(source_dir: &Path, destination: &Path) -> Result<(), EngineError> {
    fs_ops::ensure_parent_dir_exists(destination)?;

    let file = File::create(destination).map_err(|e| EngineError::from_io(destination, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Sorted walk keeps the entry order deterministic
    for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_error(destination, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| archive_error(destination, e.to_string()))?;

        writer
            .start_file(entry_name(relative), options)
            .map_err(|e| archive_error(destination, e.to_string()))?;

        let mut source = File::open(entry.path())
            .map_err(|e| EngineError::from_io(entry.path(), e))?;
        io::copy(&mut source, &mut writer)
            .map_err(|e| archive_error(destination, e.to_string()))?;
    }

    writer
        .finish()
        .map_err(|e| archive_error(destination, e.to_string()))?;
    Ok(())
}

/// Archive entry name for a relative path: components joined with `/`.
fn entry_name(relative: &Path) -> String {
    relative
        .iter()
        .map(|component| component.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn archive_error(destination: &Path, message: String) -> EngineError {
    EngineError::ArchiveFailure {
        path: destination.to_path_buf(),
        message,
    }
}
