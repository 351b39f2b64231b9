//! Store configuration.
//!
//! Paths are always passed explicitly; core keeps no process-wide default
//! location.

use std::path::{Path, PathBuf};

/// File name used by front ends when no database path is supplied.
pub const DEFAULT_DB_FILE: &str = "knowledge_base.json";

/// Locations used by one `KnowledgeBase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbConfig {
    /// JSON file mirroring the store.
    pub db_path: PathBuf,
    /// Directory receiving export files.
    pub export_dir: PathBuf,
}

impl KbConfig {
    /// Exports default to the directory holding the database file.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let export_dir = db_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            db_path,
            export_dir,
        }
    }

    pub fn with_export_dir(mut self, export_dir: impl Into<PathBuf>) -> Self {
        self.export_dir = export_dir.into();
        self
    }
}

impl Default for KbConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE)
    }
}
