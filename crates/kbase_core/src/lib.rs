//! Core domain logic for kbase, a personal knowledge base.
//! This crate is the single source of truth for business invariants.

pub mod analyzer;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use analyzer::style::{
    AnalyzerError, AnalyzerResult, BatchItem, StyleAnalyzer, StyleMetrics, StyleReport,
};
pub use config::{KbConfig, DEFAULT_DB_FILE};
pub use export::{ExportError, ExportFormat, ExportResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryId, EntryMetadata, EntryPatch, EntryValidationError};
pub use model::entry_map::EntryMap;
pub use model::tag::{normalize_tag, normalize_tags};
pub use repo::entry_repo::{EntrySnapshotRepository, JsonFileRepository, RepoError, RepoResult};
pub use search::query::{EntryListQuery, SortField, SortOrder};
pub use service::knowledge_base::{KbError, KbResult, KnowledgeBase};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
