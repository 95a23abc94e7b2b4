//! Backup - Command-line front end for the backup engine.
//!
//! Loads a JSON configuration describing the destination root and item
//! list, subscribes to the engine's observer surface, and prints log lines
//! and progress to stderr.

mod config;

use clap::Parser;
use engine::progress::{format_clock, format_size};
use engine::{create_session, plan_session, run_session, BackupObserver};
use std::path::PathBuf;
use std::time::Duration;

/// Backup - incremental backups with change detection and a recycle bin
#[derive(Parser, Debug)]
#[command(name = "backup")]
#[command(version = "0.1.0")]
#[command(about = "Back up configured files and directories, copying only what changed")]
struct Args {
    /// Configuration file (JSON) with the destination root and item list
    #[arg(long, value_name = "PATH")]
    config: PathBuf,

    /// Override the configured destination root
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Also print remaining-time estimates
    #[arg(long)]
    verbose: bool,
}

/// Console implementation of the engine's observer surface.
struct ConsoleObserver {
    verbose: bool,
}

impl ConsoleObserver {
    fn print_progress_bar(percent: u32) -> String {
        let filled = (percent / 5) as usize;
        let empty = 20 - filled;
        format!("[{}{}] {}%", "=".repeat(filled), " ".repeat(empty), percent)
    }
}

impl BackupObserver for ConsoleObserver {
    fn on_log(&self, message: &str) {
        eprintln!(
            "{} {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
    }

    fn on_progress(&self, completed_bytes: u64, total_bytes: u64) {
        let percent = if total_bytes == 0 {
            0
        } else {
            (completed_bytes as f64 / total_bytes as f64 * 100.0) as u32
        };
        eprintln!(
            "Progress: {} | {}/{}",
            Self::print_progress_bar(percent),
            format_size(completed_bytes, total_bytes),
            format_size(total_bytes, total_bytes)
        );
    }

    fn on_remaining_time(&self, remaining: Duration) {
        if self.verbose {
            eprintln!("Time remaining: {}", format_clock(remaining));
        }
    }
}

fn main() {
    let args = Args::parse();

    let exit_code = match run_cli(&args) {
        Ok(()) => 0,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic, separated for testability.
fn run_cli(args: &Args) -> Result<(), String> {
    let config = config::load(&args.config)?;
    let root = args
        .root
        .clone()
        .unwrap_or(config.destination_root);

    let mut session = create_session(&root, config.items)
        .map_err(|e| format!("Session creation failed: {}", e))?;
    plan_session(&mut session).map_err(|e| format!("Session planning failed: {}", e))?;

    let observer = ConsoleObserver {
        verbose: args.verbose,
    };
    let summary = run_session(&mut session, Some(&observer))
        .map_err(|e| format!("Session execution failed: {}", e))?;

    eprintln!(
        "Summary: {} backed up, {} skipped, {} failed",
        summary.completed_count, summary.skipped_count, summary.failed_count
    );
    if let Some(bin) = &summary.recycle_bin_path {
        eprintln!("Overwritten content preserved under: {}", bin.display());
    }
    if summary.canceled {
        eprintln!("Run was canceled before completion");
    }

    if summary.failed_count > 0 {
        Err("One or more items failed to back up".to_string())
    } else {
        Ok(())
    }
}
