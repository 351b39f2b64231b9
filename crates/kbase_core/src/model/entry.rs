//! Entry domain model.
//!
//! # Responsibility
//! - Define the record persisted for every knowledge-base entry.
//! - Derive `metadata` from content and keep timestamps ordered.
//! - Generate opaque entry identifiers.
//!
//! # Invariants
//! - `id` never changes after creation.
//! - `created_at <= updated_at`, and every mutation strictly advances `updated_at`.
//! - `metadata` always matches the current `content`.
//! - `tags` holds unique, trimmed, lowercase values. Order carries no meaning;
//!   entries built here store them sorted.
//! - Timestamps are written as RFC 3339 UTC. Offset-less ISO-8601 values are
//!   read back as UTC.

use crate::model::tag::{normalize_tag, normalize_tags};
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identifier of one entry.
pub type EntryId = String;

/// Characters read per minute when estimating `read_time`.
pub const READ_CHARS_PER_MINUTE: usize = 200;

const ID_PREFIX: &str = "kb_";
const ID_RANDOM_CHARS: usize = 8;

/// Invariant violations detected on an entry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyId,
    TimestampOrder {
        id: EntryId,
    },
    MetadataMismatch {
        id: EntryId,
        expected: EntryMetadata,
        actual: EntryMetadata,
    },
    TagsNotNormalized {
        id: EntryId,
    },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "entry id must not be empty"),
            Self::TimestampOrder { id } => {
                write!(f, "entry `{id}`: updated_at must be >= created_at")
            }
            Self::MetadataMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "entry `{id}`: metadata (word_count={}, read_time={}) does not match content (word_count={}, read_time={})",
                actual.word_count, actual.read_time, expected.word_count, expected.read_time
            ),
            Self::TagsNotNormalized { id } => {
                write!(f, "entry `{id}`: tags must be lowercase, trimmed and unique")
            }
        }
    }
}

impl Error for EntryValidationError {}

/// Content-derived metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Content length in characters.
    pub word_count: usize,
    /// Estimated minutes to read, never below 1.
    pub read_time: usize,
}

impl EntryMetadata {
    pub fn from_content(content: &str) -> Self {
        let word_count = content.chars().count();
        Self {
            word_count,
            read_time: (word_count / READ_CHARS_PER_MINUTE).max(1),
        }
    }
}

/// One knowledge-base record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub content: String,
    /// Normalized tag set.
    pub tags: Vec<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub metadata: EntryMetadata,
}

/// Partial update of an entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EntryPatch {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

impl Entry {
    /// Builds a fresh entry stamped with `now` for both timestamps.
    pub fn new<I, S>(
        id: impl Into<EntryId>,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: I,
        now: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let content = content.into();
        Self {
            id: id.into(),
            title: title.into(),
            metadata: EntryMetadata::from_content(&content),
            content,
            tags: normalize_tags(tags),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `patch` and refreshes `updated_at`.
    ///
    /// `updated_at` moves to `now`, or one nanosecond past its previous value
    /// when the clock has not advanced since the last write.
    pub fn apply(&mut self, patch: EntryPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.metadata = EntryMetadata::from_content(&content);
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + TimeDelta::nanoseconds(1)
        };
    }

    /// Checks record invariants. Used on every persisted record read back.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.id.trim().is_empty() {
            return Err(EntryValidationError::EmptyId);
        }
        if self.updated_at < self.created_at {
            return Err(EntryValidationError::TimestampOrder {
                id: self.id.clone(),
            });
        }
        let expected = EntryMetadata::from_content(&self.content);
        if expected != self.metadata {
            return Err(EntryValidationError::MetadataMismatch {
                id: self.id.clone(),
                expected,
                actual: self.metadata,
            });
        }
        if !tags_are_normalized(&self.tags) {
            return Err(EntryValidationError::TagsNotNormalized {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Returns whether any tag of this entry is contained in `normalized`.
    pub fn has_any_tag(&self, normalized: &[String]) -> bool {
        self.tags.iter().any(|tag| normalized.contains(tag))
    }
}

fn tags_are_normalized(tags: &[String]) -> bool {
    let mut seen = BTreeSet::new();
    tags.iter()
        .all(|tag| normalize_tag(tag).as_deref() == Some(tag.as_str()) && seen.insert(tag))
}

/// Parses an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp `{raw}`")))
}

/// Generates an entry id: `kb_<YYYYMMDD>_<HHMMSS>_<8 hex>`.
///
/// The random fragment keeps ids distinct within one clock second; callers
/// still check for collisions against existing ids.
pub fn generate_entry_id(now: DateTime<Utc>) -> EntryId {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{ID_PREFIX}{}_{}",
        now.format("%Y%m%d_%H%M%S"),
        &random[..ID_RANDOM_CHARS]
    )
}
