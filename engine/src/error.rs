//! Error types for the backup engine.
//!
//! The primary error type is `EngineError`. Almost all variants are
//! item-scoped: the orchestrator records them on the item and moves on to
//! the next one. The only run-fatal condition is an invalid destination
//! root, rejected before any item is processed.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

/// Errors that can occur while backing up.
///
/// Item-scoped variants are logged with their path context and never abort
/// the run; re-running the backup is the recovery path, and change
/// detection ensures only failed or stale items are reattempted.
#[derive(Debug)]
pub enum EngineError {
    /// Source path vanished before processing
    SourceMissing { path: PathBuf },

    /// Read or write permission was denied
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Generic I/O failure (disk full, path too long, ...)
    OsFailure { path: PathBuf, source: io::Error },

    /// Moving old destination content into the recycle bin failed; the
    /// overwrite that triggered preservation is aborted for that item
    PreservationFailed { path: PathBuf, source: io::Error },

    /// Archive construction failed mid-write; the partial archive is left
    /// in place
    ArchiveFailure { path: PathBuf, message: String },

    /// Destination root is empty, missing, or not a directory. Run-fatal.
    InvalidDestination { path: PathBuf, reason: String },

    /// Catch-all for unexpected errors
    Unknown { message: String },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing { path } => {
                write!(f, "Source path does not exist: {}", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(f, "Permission denied: {} ({})", path.display(), source)
            }
            Self::OsFailure { path, source } => {
                write!(f, "I/O failure: {} ({})", path.display(), source)
            }
            Self::PreservationFailed { path, source } => {
                write!(
                    f,
                    "Failed to move to recycle bin: {} ({})",
                    path.display(),
                    source
                )
            }
            Self::ArchiveFailure { path, message } => {
                write!(f, "Failed to build archive: {} ({})", path.display(), message)
            }
            Self::InvalidDestination { path, reason } => {
                write!(f, "Invalid destination root: {} ({})", path.display(), reason)
            }
            Self::Unknown { message } => {
                write!(f, "Backup error: {}", message)
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. }
            | Self::OsFailure { source, .. }
            | Self::PreservationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl EngineError {
    /// Classify an io::Error raised while touching `path`.
    pub fn from_io(path: &std::path::Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => EngineError::SourceMissing {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => EngineError::PermissionDenied {
                path: path.to_path_buf(),
                source: err,
            },
            _ => EngineError::OsFailure {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Returns true if this error must abort the whole run rather than a
    /// single item.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, EngineError::InvalidDestination { .. })
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::Unknown {
            message: err.to_string(),
        }
    }
}
