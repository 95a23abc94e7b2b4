//! # Backup Engine - Incremental Backup Library
//!
//! A headless incremental backup engine. Designed as the foundation for
//! multiple front ends (CLI, GUI, automation).
//!
//! ## Overview
//!
//! The engine copies a configured set of files and directories to a
//! destination root, doing only the work that is needed:
//! - Modification-time based change detection (unchanged items are skipped)
//! - Optional per-directory archiving into a deflate-compressed bundle
//! - Overwritten destination content is preserved in a per-run recycle bin
//!   instead of being destroyed
//! - Progress and time-remaining reporting via an observer trait
//!   (decoupled from UI technology)
//! - Per-item failure isolation and cooperative cancellation
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{create_session, plan_session, run_session, BackupItem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let items = vec![BackupItem {
//!     path: "/home/user/notes".into(),
//!     is_directory: true,
//!     compress: true,
//! }];
//!
//! // Create a session against the destination root
//! let mut session = create_session("/mnt/backup", items)?;
//!
//! // Plan the session (compute total size before any copying)
//! plan_session(&mut session)?;
//! println!("Will process {} bytes", session.total_bytes);
//!
//! // Run the session
//! let summary = run_session(&mut session, None)?;
//! println!("Elapsed: {:?}, canceled: {}", summary.elapsed, summary.canceled);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (BackupSession, ItemRecord, enums)
//! - **error**: Error types and handling
//! - **fs_ops**: Low-level filesystem operations
//! - **detect**: Modification-time based change detection
//! - **recycle**: Recycle bin for overwritten destination content
//! - **archive**: Deflate-compressed directory archives
//! - **progress**: Progress tracking and the observer trait
//! - **session**: Session orchestration (create, plan, run)

pub mod model;
pub mod error;
pub mod fs_ops;
pub mod detect;
pub mod recycle;
pub mod archive;
pub mod progress;
pub mod session;

// Re-export main types and functions
pub use model::{
    BackupItem, BackupSession, CancelFlag, ItemRecord, ItemState, RunSummary, SessionState,
};
pub use error::EngineError;
pub use progress::{BackupObserver, ProgressTracker};
pub use session::{create_session, plan_session, run_session};
