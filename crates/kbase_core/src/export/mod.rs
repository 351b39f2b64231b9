//! One-shot export of the store to Markdown or JSON files.
//!
//! # Responsibility
//! - Parse requested export formats and reject unsupported ones by name.
//! - Write each export to a new timestamped file, never overwriting.
//!
//! # Invariants
//! - Output files are named `knowledge_base_<YYYYMMDD_HHMMSS>[_<n>].<ext>`.
//! - An existing file is never truncated; a numeric suffix is chosen instead.

mod render;

pub use render::{render_json, render_markdown, JsonExport};

use crate::model::entry_map::EntryMap;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const EXPORT_FILE_PREFIX: &str = "knowledge_base";

pub type ExportResult<T> = Result<T, ExportError>;

/// Export-layer error.
#[derive(Debug)]
pub enum ExportError {
    /// Requested format is not one of `markdown` or `json`.
    UnsupportedFormat(String),
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Serialize(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(format) => write!(
                f,
                "unsupported export format: `{format}`; expected markdown|json"
            ),
            Self::Io { path, source } => {
                write!(f, "failed to write export `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnsupportedFormat(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnsupportedFormat(value.to_string())),
        }
    }
}

/// Renders `entries` in `format` and writes them to a fresh file in `dir`.
///
/// Returns the path of the written file.
pub fn export_entries(
    entries: &EntryMap,
    format: ExportFormat,
    dir: &Path,
    now: DateTime<Utc>,
) -> ExportResult<PathBuf> {
    let rendered = match format {
        ExportFormat::Markdown => render_markdown(entries, now),
        ExportFormat::Json => render_json(entries, now)?,
    };

    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let (path, mut file) = create_unique_file(dir, now, format.extension())?;
    file.write_all(rendered.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| {
            error!(
                "event=export module=export status=error format={} error_code=write_failed error={source}",
                format.as_str()
            );
            ExportError::Io {
                path: path.clone(),
                source,
            }
        })?;

    info!(
        "event=export module=export status=ok format={} entries={} bytes={}",
        format.as_str(),
        entries.len(),
        rendered.len()
    );
    Ok(path)
}

fn create_unique_file(
    dir: &Path,
    now: DateTime<Utc>,
    extension: &str,
) -> ExportResult<(PathBuf, fs::File)> {
    let stem = format!("{EXPORT_FILE_PREFIX}_{}", now.format("%Y%m%d_%H%M%S"));
    let mut attempt = 1_u32;
    loop {
        let name = if attempt == 1 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}_{attempt}.{extension}")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(ExportError::Io { path, source }),
        }
    }
}
