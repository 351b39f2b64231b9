//! Entry snapshot repository contract and JSON-file implementation.
//!
//! # Responsibility
//! - Load the whole `id -> Entry` mapping from one JSON file.
//! - Rewrite that file wholesale on every save.
//!
//! # Invariants
//! - A missing file loads as an empty mapping.
//! - Saves go to a `.tmp` sibling that is renamed over the target, so readers
//!   never observe a half-written file. Each save costs O(n) in store size.
//! - Non-ASCII text is written verbatim (UTF-8), pretty-printed.

use crate::model::entry_map::EntryMap;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for snapshot load/save.
#[derive(Debug)]
pub enum RepoError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// File content is not a valid entry mapping.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid knowledge base file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// Repository interface for whole-mapping persistence.
pub trait EntrySnapshotRepository {
    /// Loads the full mapping.
    fn load(&self) -> RepoResult<EntryMap>;
    /// Replaces the persisted mapping with `entries`.
    fn save(&self, entries: &EntryMap) -> RepoResult<()>;
}

/// Single-JSON-file snapshot repository.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: io::Error) -> RepoError {
        RepoError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|value| value.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl EntrySnapshotRepository for JsonFileRepository {
    fn load(&self) -> RepoResult<EntryMap> {
        let started_at = Instant::now();
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("event=store_load module=repo status=ok source=missing entries=0");
                return Ok(EntryMap::new());
            }
            Err(err) => {
                error!("event=store_load module=repo status=error error_code=read_failed error={err}");
                return Err(self.io_error(&self.path, err));
            }
        };

        let entries: EntryMap = serde_json::from_slice(&bytes).map_err(|source| {
            error!("event=store_load module=repo status=error error_code=invalid_json error={source}");
            RepoError::Json {
                path: self.path.clone(),
                source,
            }
        })?;

        info!(
            "event=store_load module=repo status=ok source=file entries={} bytes={} duration_ms={}",
            entries.len(),
            bytes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }

    fn save(&self, entries: &EntryMap) -> RepoResult<()> {
        let started_at = Instant::now();
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(parent, err))?;
        }

        let rendered = serde_json::to_string_pretty(entries).map_err(|source| RepoError::Json {
            path: self.path.clone(),
            source,
        })?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, rendered.as_bytes()).map_err(|err| self.io_error(&temp_path, err))?;
        fs::rename(&temp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&temp_path);
            self.io_error(&self.path, err)
        })?;

        debug!(
            "event=store_save module=repo status=ok entries={} bytes={} duration_ms={}",
            entries.len(),
            rendered.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}
