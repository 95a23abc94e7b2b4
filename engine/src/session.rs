//! Session orchestration module.
//!
//! This module provides the session lifecycle functions:
//! - Creating a session from a destination root and an item list
//! - Planning a session (computing the total backup size)
//! - Running a session (executing the backup)
//!
//! Items are processed strictly in registration order. Failures are
//! item-scoped: a failed item is logged and the run moves on. Cancellation
//! is observed between items only, and a canceled run still finalizes the
//! recycle bin and reports its elapsed time.

use crate::archive;
use crate::detect;
use crate::error::EngineError;
use crate::fs_ops;
use crate::model::{
    BackupItem, BackupSession, CancelFlag, ItemRecord, ItemState, RunSummary, SessionState,
};
use crate::progress::{self, BackupObserver, ProgressTracker};
use crate::recycle::RecycleBin;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use uuid::Uuid;
use walkdir::WalkDir;

/// How one item ended, as seen by the run loop.
enum ItemOutcome {
    /// Work was performed
    Backed,
    /// Destination was already up to date, or the source vanished
    Skipped,
}

/// Create a new backup session.
///
/// The destination root is the only run-fatal validation: it must be a
/// non-empty path naming an existing directory. Everything else is checked
/// per item while the session runs.
pub fn create_session<P: AsRef<Path>>(
    destination_root: P,
    items: Vec<BackupItem>,
) -> Result<BackupSession, EngineError> {
    let destination_root = destination_root.as_ref();

    if destination_root.as_os_str().is_empty() {
        return Err(EngineError::InvalidDestination {
            path: destination_root.to_path_buf(),
            reason: "destination root is empty".to_string(),
        });
    }

    match fs::metadata(destination_root) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            return Err(EngineError::InvalidDestination {
                path: destination_root.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }
        Err(e) => {
            return Err(EngineError::InvalidDestination {
                path: destination_root.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }

    Ok(BackupSession {
        id: Uuid::new_v4(),
        destination_root: destination_root.to_path_buf(),
        items: items.into_iter().map(ItemRecord::from).collect(),
        state: SessionState::Pending,
        total_bytes: 0,
        completed_bytes: 0,
        cancel: CancelFlag::new(),
        recycle_bin_path: None,
        created_at: SystemTime::now(),
        start_time: None,
        end_time: None,
    })
}

/// Plan a session by measuring every item.
///
/// Populates each record's size and the session total. The total is
/// computed once, before any copying; a source that grows mid-run is not
/// reflected in the estimate.
pub fn plan_session(session: &mut BackupSession) -> Result<(), EngineError> {
    if session.state != SessionState::Pending {
        return Err(EngineError::Unknown {
            message: format!(
                "session must be in Pending state to plan; current state: {:?}",
                session.state
            ),
        });
    }

    for record in &mut session.items {
        record.size = fs_ops::source_size(&record.source_path);
    }
    session.total_bytes = session.items.iter().map(|record| record.size).sum();
    Ok(())
}

/// Run a session, executing the backup.
///
/// Transitions session state from Pending to Running to Completed and
/// drives each item through its state machine. Individual item errors are
/// recorded on the item and do NOT stop the run. Regardless of failures or
/// cancellation, the recycle bin is finalized and the elapsed time logged.
///
/// # Errors
/// Returns EngineError only for session-level misuse; item-level errors are
/// recorded in the item records and counted in the summary.
pub fn run_session(
    session: &mut BackupSession,
    observer: Option<&dyn BackupObserver>,
) -> Result<RunSummary, EngineError> {
    if session.state != SessionState::Pending {
        return Err(EngineError::Unknown {
            message: format!(
                "session must be in Pending state to run; current state: {:?}",
                session.state
            ),
        });
    }

    session.state = SessionState::Running;
    session.start_time = Some(SystemTime::now());
    let started = Instant::now();

    let bin = RecycleBin::new(&session.destination_root, Local::now());
    session.recycle_bin_path = Some(bin.path().to_path_buf());

    let mut tracker = ProgressTracker::new(session.total_bytes);
    emit_log(
        observer,
        &format!(
            "Starting backup of {} items, {} total",
            session.items.len(),
            progress::format_size(session.total_bytes, session.total_bytes)
        ),
    );

    let mut canceled = false;
    for index in 0..session.items.len() {
        if session.cancel.is_requested() {
            canceled = true;
            emit_log(observer, "Backup canceled; remaining items left untouched");
            break;
        }

        let size = session.items[index].size;
        match process_item(
            &mut session.items[index],
            &session.destination_root,
            &bin,
            observer,
        ) {
            Ok(ItemOutcome::Skipped) => {
                tracker.record_completed(size);
            }
            Ok(ItemOutcome::Backed) => {
                tracker.record_completed(size);
                emit_log(
                    observer,
                    &format!(
                        "Completed {:.2}% of backup, {}",
                        tracker.percentage(),
                        progress::format_size(tracker.completed_bytes(), tracker.total_bytes())
                    ),
                );
            }
            Err(error) => {
                let record = &mut session.items[index];
                record.state = ItemState::Failed;
                record.error_message = Some(error.to_string());
                emit_log(
                    observer,
                    &format!("Failed: {} ({})", record.source_path.display(), error),
                );
            }
        }

        if let Some(observer) = observer {
            observer.on_progress(tracker.completed_bytes(), tracker.total_bytes());
            observer.on_remaining_time(tracker.estimated_remaining(started.elapsed()));
        }
    }

    session.completed_bytes = tracker.completed_bytes();

    match bin.finalize() {
        Ok(None) => {
            session.recycle_bin_path = None;
            emit_log(observer, "Recycle bin ended empty and was removed");
        }
        Ok(Some(path)) => {
            emit_log(
                observer,
                &format!("Recycle bin retained: {}", path.display()),
            );
        }
        Err(error) => {
            emit_log(
                observer,
                &format!("Warning: could not finalize recycle bin: {}", error),
            );
        }
    }

    let elapsed = started.elapsed();
    emit_log(
        observer,
        &format!("Elapsed: {}", progress::format_elapsed(elapsed)),
    );
    if !canceled {
        emit_log(observer, "Backup run complete");
    }

    session.state = SessionState::Completed;
    session.end_time = Some(SystemTime::now());

    let completed_count = count_state(session, ItemState::Completed);
    let skipped_count = count_state(session, ItemState::Skipped);
    let failed_count = count_state(session, ItemState::Failed);

    Ok(RunSummary {
        elapsed,
        canceled,
        recycle_bin_path: session.recycle_bin_path.clone(),
        completed_count,
        skipped_count,
        failed_count,
        total_bytes: session.total_bytes,
        completed_bytes: session.completed_bytes,
    })
}

fn count_state(session: &BackupSession, state: ItemState) -> usize {
    session
        .items
        .iter()
        .filter(|record| record.state == state)
        .count()
}

/// Drive one item through its state machine.
///
/// Returns Ok for items that reached Skipped or Completed; an Err leaves
/// the state where processing stopped and the caller marks the item Failed.
fn process_item(
    record: &mut ItemRecord,
    destination_root: &Path,
    bin: &RecycleBin,
    observer: Option<&dyn BackupObserver>,
) -> Result<ItemOutcome, EngineError> {
    record.state = ItemState::Evaluating;

    if !record.source_path.exists() {
        record.state = ItemState::Skipped;
        emit_log(
            observer,
            &format!(
                "Warning: source path does not exist, skipped: {}",
                record.source_path.display()
            ),
        );
        return Ok(ItemOutcome::Skipped);
    }

    let mut destination = fs_ops::destination_for(&record.source_path, destination_root)?;
    if record.is_directory && record.compress {
        destination = with_archive_suffix(destination);
    }
    record.destination_path = Some(destination.clone());

    if !detect::needs_update(&record.source_path, &destination)? {
        record.state = ItemState::Skipped;
        emit_log(
            observer,
            &format!("Not updated, skipped: {}", record.source_path.display()),
        );
        return Ok(ItemOutcome::Skipped);
    }

    if record.is_directory && !record.compress {
        mirror_directory(record, &destination, bin, observer)?;
        record.state = ItemState::Completed;
        emit_log(
            observer,
            &format!(
                "Backed up: {} -> {}",
                record.source_path.display(),
                destination.display()
            ),
        );
        return Ok(ItemOutcome::Backed);
    }

    // A single destination object: a plain file, or one archive file
    if destination.exists() {
        record.state = ItemState::Preserving;
        emit_log(
            observer,
            &format!("Preserving previous copy: {}", destination.display()),
        );
        bin.preserve(&destination)?;
    }

    record.state = ItemState::Writing;
    if record.is_directory {
        archive::build_archive(&record.source_path, &destination)?;
        emit_log(
            observer,
            &format!(
                "Compressed and backed up: {} -> {}",
                record.source_path.display(),
                destination.display()
            ),
        );
    } else {
        fs_ops::copy_file_with_metadata(&record.source_path, &destination)?;
        emit_log(
            observer,
            &format!(
                "Backed up: {} -> {}",
                record.source_path.display(),
                destination.display()
            ),
        );
    }

    record.state = ItemState::Completed;
    Ok(ItemOutcome::Backed)
}

/// Mirror a directory item file by file.
///
/// Every contained file gets its own change decision and its own
/// preservation, so an unchanged file inside an otherwise-changed directory
/// is left untouched. The first file-level error aborts the item; files
/// already mirrored stay in place.
fn mirror_directory(
    record: &mut ItemRecord,
    destination: &Path,
    bin: &RecycleBin,
    observer: Option<&dyn BackupObserver>,
) -> Result<(), EngineError> {
    let source = record.source_path.clone();

    for entry in WalkDir::new(&source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| source.clone());
            EngineError::from_io(&path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&source)
            .map_err(|e| EngineError::Unknown {
                message: e.to_string(),
            })?;
        let mirrored = destination.join(relative);

        record.state = ItemState::Evaluating;
        if !detect::needs_update(entry.path(), &mirrored)? {
            continue;
        }

        if mirrored.exists() {
            record.state = ItemState::Preserving;
            bin.preserve(&mirrored)?;
        }

        record.state = ItemState::Writing;
        fs_ops::copy_file_with_metadata(entry.path(), &mirrored)?;
        emit_log(
            observer,
            &format!(
                "Backed up file: {} -> {}",
                entry.path().display(),
                mirrored.display()
            ),
        );
    }
    Ok(())
}

/// Append the archive suffix to a directory's mirrored path, keeping the
/// directory name intact (`notes.d` becomes `notes.d.zip`).
fn with_archive_suffix(path: PathBuf) -> PathBuf {
    let mut raw = path.into_os_string();
    raw.push(".zip");
    PathBuf::from(raw)
}

fn emit_log(observer: Option<&dyn BackupObserver>, message: &str) {
    if let Some(observer) = observer {
        observer.on_log(message);
    }
}
