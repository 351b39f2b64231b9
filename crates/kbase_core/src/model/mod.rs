//! Knowledge-base domain model.
//!
//! # Responsibility
//! - Define the canonical entry record persisted by the store.
//! - Own derived-field rules (metadata, tag normalization, id shape).
//!
//! # Invariants
//! - Every entry is identified by an opaque, immutable `EntryId`.
//! - Derived metadata is recomputed from content, never set directly by callers.

pub mod entry;
pub mod entry_map;
pub mod tag;
