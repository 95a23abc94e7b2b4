//! Core data model for backup sessions.
//!
//! This module defines the main data structures for representing one backup
//! run:
//! - BackupItem: one configured source path, as supplied by the caller
//! - ItemRecord: a BackupItem plus its per-run processing state
//! - BackupSession: the state of one invocation of the run operation
//! - ItemState, SessionState: enums controlling behavior
//! - CancelFlag: shared one-way cancellation switch
//! - RunSummary: what the run operation hands back to the caller

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// One configured backup target: a single file or directory.
///
/// Items are created by the caller (UI or imported configuration) and are
/// immutable for the duration of a run. Identity is the source path.
/// The serialized field names match the external configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupItem {
    /// Source path to back up
    pub path: PathBuf,

    /// True if the source is a directory
    pub is_directory: bool,

    /// Archive the directory into a single compressed file instead of
    /// mirroring it. Ignored for file items.
    pub compress: bool,
}

/// A backup item together with its per-run processing state.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    /// Unique identifier for this item within the session
    pub id: Uuid,

    /// Full source path
    pub source_path: PathBuf,

    /// True if the source is a directory
    pub is_directory: bool,

    /// Archive the directory instead of mirroring it
    pub compress: bool,

    /// Resolved destination path (set while the item is processed; for a
    /// compressed directory this is the archive file)
    pub destination_path: Option<PathBuf>,

    /// Size in bytes as measured during planning (recursive for directories)
    pub size: u64,

    /// Current state of this item
    pub state: ItemState,

    /// Human-readable error message if state is Failed
    pub error_message: Option<String>,
}

impl From<BackupItem> for ItemRecord {
    fn from(item: BackupItem) -> Self {
        ItemRecord {
            id: Uuid::new_v4(),
            source_path: item.path,
            is_directory: item.is_directory,
            compress: item.compress,
            destination_path: None,
            size: 0,
            state: ItemState::Pending,
            error_message: None,
        }
    }
}

/// The state of an individual item within a session.
///
/// Items advance Pending -> Evaluating -> Preserving -> Writing -> Completed.
/// Evaluating can short-circuit to Skipped, and any working state can fall
/// into Failed. Failed never aborts the run; the next item is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Not yet processed
    Pending,
    /// Change detection in progress
    Evaluating,
    /// Old destination content is being moved to the recycle bin
    Preserving,
    /// Copy or archive write in progress
    Writing,
    /// Destination was already up to date, or the source vanished
    Skipped,
    /// Backed up successfully
    Completed,
    /// Error occurred; item not backed up
    Failed,
}

impl ItemState {
    /// Returns true if this state is terminal (no further changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemState::Skipped | ItemState::Completed | ItemState::Failed
        )
    }
}

/// The state of an entire backup session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet started
    Pending,
    /// Currently executing
    Running,
    /// All items processed, or the run was canceled
    Completed,
}

/// Shared cancellation switch.
///
/// One-way: once requested, a run stops starting new item work. Requesting
/// cancellation is idempotent and safe from any thread. Cancellation is
/// cooperative; an in-flight copy or archive write is not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation of the run this flag belongs to.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation has been requested.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The in-memory state of one invocation of the backup run.
///
/// A session is ephemeral: it is constructed fresh for every run and is not
/// reused. Items belong to configuration and outlive it.
#[derive(Debug)]
pub struct BackupSession {
    /// Unique identifier for this session
    pub id: Uuid,

    /// Root directory all destinations are mirrored under
    pub destination_root: PathBuf,

    /// All items in this session, in registration order
    pub items: Vec<ItemRecord>,

    /// Current session state (Pending, Running, Completed)
    pub state: SessionState,

    /// Total bytes across all items, computed once during planning and
    /// never recomputed mid-run
    pub total_bytes: u64,

    /// Bytes accounted for so far; monotonically non-decreasing
    pub completed_bytes: u64,

    /// Cancellation switch shared with the caller
    pub cancel: CancelFlag,

    /// Recycle bin directory for this run (set when the run starts, cleared
    /// again if the bin ended empty and was removed)
    pub recycle_bin_path: Option<PathBuf>,

    /// When the session was created
    pub created_at: SystemTime,

    /// When session execution started
    pub start_time: Option<SystemTime>,

    /// When session execution completed
    pub end_time: Option<SystemTime>,
}

/// Result of one backup run, handed back to the caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Total wall-clock time of the run
    pub elapsed: Duration,

    /// True if cancellation was observed before the item list was exhausted
    pub canceled: bool,

    /// Path of the recycle bin if it was retained (it received at least one
    /// entry); None if it ended the run empty and was removed
    pub recycle_bin_path: Option<PathBuf>,

    /// Items backed up
    pub completed_count: usize,

    /// Items skipped (destination up to date, or source vanished)
    pub skipped_count: usize,

    /// Items that failed
    pub failed_count: usize,

    /// Total bytes across all items as planned
    pub total_bytes: u64,

    /// Bytes accounted for by the run
    pub completed_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_record_from_backup_item() {
        let item = BackupItem {
            path: PathBuf::from("/data/photos"),
            is_directory: true,
            compress: true,
        };

        let record = ItemRecord::from(item.clone());
        assert_eq!(record.source_path, item.path);
        assert!(record.is_directory);
        assert!(record.compress);
        assert_eq!(record.state, ItemState::Pending);
        assert_eq!(record.size, 0);
        assert!(record.destination_path.is_none());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_item_state_terminal() {
        assert!(ItemState::Completed.is_terminal());
        assert!(ItemState::Skipped.is_terminal());
        assert!(ItemState::Failed.is_terminal());
        assert!(!ItemState::Pending.is_terminal());
        assert!(!ItemState::Evaluating.is_terminal());
        assert!(!ItemState::Preserving.is_terminal());
        assert!(!ItemState::Writing.is_terminal());
    }

    #[test]
    fn test_cancel_flag_is_one_way_and_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_requested());

        clone.request();
        assert!(flag.is_requested());

        // Idempotent
        clone.request();
        assert!(flag.is_requested());
    }

    #[test]
    fn test_backup_item_config_field_names() {
        let json = r#"{"path":"/home/user/a.txt","isDirectory":false,"compress":false}"#;
        let item: BackupItem = serde_json::from_str(json).expect("Failed to parse item");
        assert_eq!(item.path, PathBuf::from("/home/user/a.txt"));
        assert!(!item.is_directory);
        assert!(!item.compress);

        let round_trip = serde_json::to_string(&item).expect("Failed to serialize item");
        assert_eq!(round_trip, json);
    }
}
