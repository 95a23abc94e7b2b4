//! Progress tracking and the observer trait.
//!
//! The tracker turns byte counters into percentages and a time-remaining
//! estimate. The observer trait decouples the engine from any specific
//! front end; a CLI, GUI or service subscribes to log lines and progress
//! without the engine depending on a UI toolkit.

use crate::fs_ops;
use crate::model::BackupItem;
use std::time::Duration;

/// Trait for receiving updates from a running backup session.
///
/// Implement this trait to receive callbacks during session execution.
/// All methods are called synchronously on the thread driving the run.
pub trait BackupObserver: Send {
    /// Called for every item state transition, warning, and summary line.
    fn on_log(&self, message: &str);

    /// Called after each item's work is recorded.
    fn on_progress(&self, completed_bytes: u64, total_bytes: u64);

    /// Called alongside progress with the estimated time remaining.
    fn on_remaining_time(&self, remaining: Duration);
}

/// Sum of the on-disk sizes of all items: file size for file items,
/// recursive size for directory items. Computed once, before any copying.
pub fn total_size(items: &[BackupItem]) -> u64 {
    items.iter().map(|item| fs_ops::source_size(&item.path)).sum()
}

/// Byte-level progress for one run.
///
/// `completed` is monotonically non-decreasing and clamped at the total, so
/// a source that grew after planning cannot push the percentage past 100.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    total_bytes: u64,
    completed_bytes: u64,
}

impl ProgressTracker {
    pub fn new(total_bytes: u64) -> Self {
        ProgressTracker {
            total_bytes,
            completed_bytes: 0,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn completed_bytes(&self) -> u64 {
        self.completed_bytes
    }

    /// Account for `bytes` of finished work.
    pub fn record_completed(&mut self, bytes: u64) {
        self.completed_bytes = self
            .completed_bytes
            .saturating_add(bytes)
            .min(self.total_bytes);
    }

    /// Percent complete; 0 when there is nothing to do.
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.completed_bytes as f64 / self.total_bytes as f64 * 100.0
        }
    }

    /// Estimated time remaining by linear extrapolation from the bytes
    /// completed so far. Zero until any work has completed. Noisy early in
    /// a run; no smoothing is applied.
    pub fn estimated_remaining(&self, elapsed: Duration) -> Duration {
        if self.completed_bytes == 0 {
            return Duration::ZERO;
        }
        let outstanding = self.total_bytes.saturating_sub(self.completed_bytes);
        elapsed.mul_f64(outstanding as f64 / self.completed_bytes as f64)
    }
}

/// Human-readable size, with the unit chosen by `total_bytes` so every
/// progress string in one run shares the same unit.
pub fn format_size(bytes: u64, total_bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;

    if total_bytes < KIB {
        format!("{}B", bytes)
    } else if total_bytes < MIB {
        format!("{:.2}KB", bytes as f64 / KIB as f64)
    } else if total_bytes < GIB {
        format!("{:.2}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.2}GB", bytes as f64 / GIB as f64)
    }
}

/// Clock-style duration, `HH:MM:SS`.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Elapsed-time summary with both components and fractional seconds,
/// e.g. `0h 1m 5s (65.21s)`.
pub fn format_elapsed(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{}h {}m {}s ({:.2}s)",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        duration.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_total_size_spans_files_and_directories() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("f.txt");
        fs::write(&file, b"12345").expect("Failed to write file");

        let tree = temp_dir.path().join("tree");
        fs::create_dir_all(tree.join("sub")).expect("Failed to create dirs");
        fs::write(tree.join("a.txt"), b"123").expect("Failed to write a.txt");
        fs::write(tree.join("sub").join("b.txt"), b"1234").expect("Failed to write b.txt");

        let items = vec![
            BackupItem {
                path: file,
                is_directory: false,
                compress: false,
            },
            BackupItem {
                path: tree,
                is_directory: true,
                compress: false,
            },
            BackupItem {
                path: PathBuf::from("/does/not/exist"),
                is_directory: false,
                compress: false,
            },
        ];

        assert_eq!(total_size(&items), 12);
    }

    #[test]
    fn test_record_completed_clamps_at_total() {
        let mut tracker = ProgressTracker::new(100);
        tracker.record_completed(60);
        assert_eq!(tracker.completed_bytes(), 60);

        tracker.record_completed(60);
        assert_eq!(tracker.completed_bytes(), 100);
        assert_eq!(tracker.percentage(), 100.0);
    }

    #[test]
    fn test_percentage_well_defined_for_empty_run() {
        let tracker = ProgressTracker::new(0);
        assert_eq!(tracker.percentage(), 0.0);
    }

    #[test]
    fn test_estimated_remaining_extrapolates_linearly() {
        let mut tracker = ProgressTracker::new(100);
        assert_eq!(
            tracker.estimated_remaining(Duration::from_secs(10)),
            Duration::ZERO
        );

        tracker.record_completed(25);
        // 75 outstanding at 25 bytes per 10s
        assert_eq!(
            tracker.estimated_remaining(Duration::from_secs(10)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_format_size_unit_follows_total() {
        assert_eq!(format_size(512, 900), "512B");
        assert_eq!(format_size(512, 10 * 1024), "0.50KB");
        assert_eq!(format_size(1024 * 1024, 5 * 1024 * 1024), "1.00MB");
        assert_eq!(
            format_size(3 * 1024 * 1024 * 1024 / 2, 2 * 1024 * 1024 * 1024),
            "1.50GB"
        );
    }

    #[test]
    fn test_format_clock_and_elapsed() {
        assert_eq!(format_clock(Duration::from_secs(3661)), "01:01:01");
        assert_eq!(format_elapsed(Duration::from_millis(65_210)), "0h 1m 5s (65.21s)");
    }
}
