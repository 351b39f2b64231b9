//! Knowledge-base store service.
//!
//! # Responsibility
//! - Own the in-memory `id -> Entry` mapping for one database file.
//! - Provide create/read/update/delete plus list, search, tag filter and export.
//!
//! # Invariants
//! - Every successful mutation has been persisted before the call returns.
//! - A mutation whose save fails leaves the in-memory mapping unchanged.
//! - Unknown ids on update/delete report `false`, not an error.
//! - Entries leave the store only as shared borrows or clones.

use crate::config::KbConfig;
use crate::export::{export_entries, ExportError, ExportFormat};
use crate::model::entry::{generate_entry_id, Entry, EntryId, EntryPatch};
use crate::model::entry_map::EntryMap;
use crate::repo::entry_repo::{EntrySnapshotRepository, JsonFileRepository, RepoError};
use crate::search::query::{
    collect_tags, filter_entries_by_tags, list_entries, search_entries, EntryListQuery,
};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type KbResult<T> = Result<T, KbError>;

/// Service error for knowledge-base use-cases.
#[derive(Debug)]
pub enum KbError {
    /// Loading or persisting the mapping failed.
    Repo(RepoError),
    /// Export failed or the format is unsupported.
    Export(ExportError),
    /// Internal consistency mismatch in the in-memory mapping.
    InconsistentState(&'static str),
}

impl Display for KbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent knowledge base state: {details}")
            }
        }
    }
}

impl Error for KbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for KbError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ExportError> for KbError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Knowledge base backed by a snapshot repository.
pub struct KnowledgeBase<R: EntrySnapshotRepository = JsonFileRepository> {
    repo: R,
    entries: EntryMap,
    export_dir: PathBuf,
}

impl KnowledgeBase<JsonFileRepository> {
    /// Opens the JSON file at `config.db_path`, starting empty if it is absent.
    pub fn open(config: KbConfig) -> KbResult<Self> {
        let repo = JsonFileRepository::new(config.db_path);
        Self::with_repository(repo, config.export_dir)
    }

    pub fn db_path(&self) -> &Path {
        self.repo.path()
    }
}

impl<R: EntrySnapshotRepository> KnowledgeBase<R> {
    /// Creates a store over `repo`, loading its current snapshot.
    pub fn with_repository(repo: R, export_dir: impl Into<PathBuf>) -> KbResult<Self> {
        let entries = repo.load()?;
        Ok(Self {
            repo,
            entries,
            export_dir: export_dir.into(),
        })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Read-only view of the full mapping, in insertion order.
    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates one entry and returns its generated id.
    pub fn create<I, S>(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: I,
    ) -> KbResult<EntryId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let started_at = Instant::now();
        let now = Utc::now();
        let id = self.unused_id(now);
        let entry = Entry::new(id.clone(), title, content, tags, now);
        let word_count = entry.metadata.word_count;
        self.entries
            .push(entry)
            .map_err(|_| KbError::InconsistentState("generated id already present"))?;

        if let Err(err) = self.repo.save(&self.entries) {
            self.entries.remove(&id);
            log_mutation_error("entry_create", &id, &err);
            return Err(err.into());
        }

        info!(
            "event=entry_create module=service status=ok entry_id={id} word_count={word_count} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    /// Looks up one entry.
    pub fn read(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// Applies `patch` to an existing entry.
    ///
    /// Returns `Ok(false)` when `id` is unknown.
    pub fn update(&mut self, id: &str, patch: EntryPatch) -> KbResult<bool> {
        let started_at = Instant::now();
        let Some(entry) = self.entries.get_mut(id) else {
            info!("event=entry_update module=service status=not_found entry_id={id}");
            return Ok(false);
        };

        let previous = entry.clone();
        entry.apply(patch, Utc::now());

        if let Err(err) = self.repo.save(&self.entries) {
            if let Some(entry) = self.entries.get_mut(id) {
                *entry = previous;
            }
            log_mutation_error("entry_update", id, &err);
            return Err(err.into());
        }

        info!(
            "event=entry_update module=service status=ok entry_id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(true)
    }

    /// Deletes one entry.
    ///
    /// Returns `Ok(false)` when `id` is unknown.
    pub fn delete(&mut self, id: &str) -> KbResult<bool> {
        let Some((index, removed)) = self.entries.remove(id) else {
            info!("event=entry_delete module=service status=not_found entry_id={id}");
            return Ok(false);
        };

        if let Err(err) = self.repo.save(&self.entries) {
            self.entries.restore(index, removed);
            log_mutation_error("entry_delete", id, &err);
            return Err(err.into());
        }

        info!("event=entry_delete module=service status=ok entry_id={id}");
        Ok(true)
    }

    /// Lists all entries using `query` ordering.
    pub fn list_all(&self, query: &EntryListQuery) -> Vec<&Entry> {
        list_entries(&self.entries, query)
    }

    /// Case-insensitive keyword search over title and content.
    pub fn search(&self, keyword: &str) -> Vec<&Entry> {
        let hits = search_entries(&self.entries, keyword);
        info!(
            "event=entry_search module=service status=ok keyword_chars={} hits={}",
            keyword.chars().count(),
            hits.len()
        );
        hits
    }

    /// Entries carrying any of `tags`.
    pub fn filter_by_tags<I, S>(&self, tags: I) -> Vec<&Entry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        filter_entries_by_tags(&self.entries, tags)
    }

    /// Distinct tags used by stored entries, sorted.
    pub fn list_tags(&self) -> Vec<String> {
        collect_tags(&self.entries)
    }

    /// Exports the full store; `format` is `markdown` or `json`.
    ///
    /// Returns the path of the written file.
    pub fn export(&self, format: &str) -> KbResult<PathBuf> {
        let format = format.parse::<ExportFormat>().map_err(|err| {
            error!("event=export module=service status=error error_code=unsupported_format");
            err
        })?;
        self.export_as(format, Utc::now())
    }

    /// Exports with an explicit format and timestamp.
    pub fn export_as(&self, format: ExportFormat, now: DateTime<Utc>) -> KbResult<PathBuf> {
        Ok(export_entries(&self.entries, format, &self.export_dir, now)?)
    }

    fn unused_id(&self, now: DateTime<Utc>) -> EntryId {
        loop {
            let id = generate_entry_id(now);
            if !self.entries.contains(&id) {
                return id;
            }
        }
    }
}

fn log_mutation_error(event: &str, id: &str, err: &RepoError) {
    error!(
        "event={event} module=service status=error error_code=persist_failed entry_id={id} error={err}"
    );
}
