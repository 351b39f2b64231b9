//! In-memory query entry points.
//!
//! # Responsibility
//! - Sort, search and tag-filter the store's mapping.
//! - Keep result ordering rules inside core.

pub mod query;
