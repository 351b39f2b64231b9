//! Listing, keyword search and tag filtering over an `EntryMap`.
//!
//! # Invariants
//! - Search and tag filter results keep insertion order.
//! - Sorting is stable: entries with equal keys keep insertion order in
//!   both directions.
//! - Matching is case-insensitive everywhere.

use crate::model::entry::Entry;
use crate::model::entry_map::EntryMap;
use crate::model::tag::normalize_tags;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Field a listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    /// Parses `created_at`, `updated_at` or `title`.
    ///
    /// Unknown names return `None`, which lists in insertion order.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    fn compare(self, left: &Entry, right: &Entry) -> Ordering {
        match self {
            Self::CreatedAt => left.created_at.cmp(&right.created_at),
            Self::UpdatedAt => left.updated_at.cmp(&right.updated_at),
            Self::Title => left.title.cmp(&right.title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Listing options. Defaults to newest-created first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryListQuery {
    /// `None` keeps insertion order and ignores `order`.
    pub sort_by: Option<SortField>,
    pub order: SortOrder,
}

impl Default for EntryListQuery {
    fn default() -> Self {
        Self {
            sort_by: Some(SortField::CreatedAt),
            order: SortOrder::Desc,
        }
    }
}

impl EntryListQuery {
    /// Builds a query from loosely typed names, as accepted by front ends.
    pub fn from_names(sort_by: &str, order: SortOrder) -> Self {
        Self {
            sort_by: SortField::from_name(sort_by),
            order,
        }
    }
}

/// Lists all entries in the requested order.
pub fn list_entries<'a>(entries: &'a EntryMap, query: &EntryListQuery) -> Vec<&'a Entry> {
    let Some(field) = query.sort_by else {
        return entries.iter().collect();
    };

    let mut ranked: Vec<(usize, &Entry)> = entries.iter().enumerate().collect();
    ranked.sort_by(|(left_pos, left), (right_pos, right)| {
        let by_key = match query.order {
            SortOrder::Asc => field.compare(left, right),
            SortOrder::Desc => field.compare(right, left),
        };
        by_key.then(left_pos.cmp(right_pos))
    });
    ranked.into_iter().map(|(_, entry)| entry).collect()
}

/// Case-insensitive substring search over title and content.
///
/// An empty keyword is a substring of everything and matches every entry.
pub fn search_entries<'a>(entries: &'a EntryMap, keyword: &str) -> Vec<&'a Entry> {
    let needle = keyword.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry.title.to_lowercase().contains(&needle)
                || entry.content.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Returns entries carrying at least one of `tags` (OR semantics).
pub fn filter_entries_by_tags<'a, I, S>(entries: &'a EntryMap, tags: I) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let wanted = normalize_tags(tags);
    if wanted.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .filter(|entry| entry.has_any_tag(&wanted))
        .collect()
}

/// Distinct tags used across the store, sorted.
pub fn collect_tags(entries: &EntryMap) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{list_entries, EntryListQuery, SortField, SortOrder};
    use crate::model::entry::Entry;
    use crate::model::entry_map::EntryMap;
    use chrono::{TimeZone, Utc};

    fn same_instant_map() -> EntryMap {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut map = EntryMap::new();
        for id in ["first", "second", "third"] {
            map.push(Entry::new(id, id, "body", Vec::<String>::new(), now))
                .unwrap();
        }
        map
    }

    fn ids(entries: Vec<&Entry>) -> Vec<&str> {
        entries.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn equal_keys_keep_insertion_order_in_both_directions() {
        let map = same_instant_map();
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let query = EntryListQuery {
                sort_by: Some(SortField::CreatedAt),
                order,
            };
            assert_eq!(
                ids(list_entries(&map, &query)),
                ["first", "second", "third"],
                "order {order:?}"
            );
        }
    }

    #[test]
    fn desc_title_sort_is_stable_for_equal_titles() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut map = EntryMap::new();
        for (id, title) in [("first", "same"), ("zed", "zzz"), ("second", "same")] {
            map.push(Entry::new(id, title, "body", ["t"], now)).unwrap();
        }
        let query = EntryListQuery {
            sort_by: Some(SortField::Title),
            order: SortOrder::Desc,
        };

        assert_eq!(ids(list_entries(&map, &query)), ["zed", "first", "second"]);
    }

    #[test]
    fn unknown_sort_field_keeps_insertion_order() {
        let map = same_instant_map();
        let query = EntryListQuery::from_names("word_count", SortOrder::Desc);
        assert_eq!(query.sort_by, None);
        assert_eq!(ids(list_entries(&map, &query)), ["first", "second", "third"]);
    }

    #[test]
    fn sort_order_names_are_case_insensitive() {
        assert_eq!(SortOrder::from_name("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::from_name("down"), None);
    }
}
