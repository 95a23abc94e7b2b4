//! Configuration document for the CLI front end.
//!
//! A backup run is described by a small JSON document holding the
//! destination root and the item list. The engine never reads this file;
//! it receives the already-parsed shapes.
//!
//! ```json
//! {
//!   "destinationRoot": "/mnt/backup",
//!   "items": [
//!     { "path": "/home/user/notes.txt", "isDirectory": false, "compress": false },
//!     { "path": "/home/user/photos", "isDirectory": true, "compress": true }
//!   ]
//! }
//! ```

use engine::BackupItem;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The persisted run description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfig {
    /// Root directory all destinations are mirrored under
    pub destination_root: PathBuf,

    /// Backup targets, processed in listed order
    pub items: Vec<BackupItem>,
}

/// Load and parse a configuration file.
pub fn load(path: &Path) -> Result<BackupConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_parses_full_document() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("backup.json");
        fs::write(
            &path,
            r#"{
                "destinationRoot": "/mnt/backup",
                "items": [
                    { "path": "/home/user/a.txt", "isDirectory": false, "compress": false },
                    { "path": "/home/user/photos", "isDirectory": true, "compress": true }
                ]
            }"#,
        )
        .expect("Failed to write config");

        let config = load(&path).expect("Failed to load config");
        assert_eq!(config.destination_root, PathBuf::from("/mnt/backup"));
        assert_eq!(config.items.len(), 2);
        assert!(!config.items[0].is_directory);
        assert!(config.items[1].compress);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = load(&temp_dir.path().join("nonexistent.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_reports_malformed_document() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("backup.json");
        fs::write(&path, "{ not json").expect("Failed to write config");

        let result = load(&path);
        assert!(result.is_err());
    }
}
