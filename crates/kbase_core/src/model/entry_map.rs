//! Insertion-ordered `id -> Entry` mapping.
//!
//! # Responsibility
//! - Hold the store's full dataset in insertion order.
//! - Serialize as one JSON object keyed by entry id, preserving order.
//!
//! # Invariants
//! - Ids are unique.
//! - Deserialization rejects key/id mismatches, duplicate ids and records
//!   failing `Entry::validate()`.

use crate::model::entry::Entry;
use serde::de::{self, Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Formatter;

/// Ordered entry collection. Lookups are linear; the store is small by contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMap {
    entries: Vec<Entry>,
}

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Appends `entry`. Returns it back when its id is already present.
    pub(crate) fn push(&mut self, entry: Entry) -> Result<(), Entry> {
        if self.contains(&entry.id) {
            return Err(entry);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Removes the entry and reports the position it occupied.
    pub(crate) fn remove(&mut self, id: &str) -> Option<(usize, Entry)> {
        let index = self.position(id)?;
        Some((index, self.entries.remove(index)))
    }

    /// Re-inserts a previously removed entry at its old position.
    pub(crate) fn restore(&mut self, index: usize, entry: Entry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}

impl<'a> IntoIterator for &'a EntryMap {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for EntryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|entry| (&entry.id, entry)))
    }
}

impl<'de> Deserialize<'de> for EntryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntryMapVisitor)
    }
}

struct EntryMapVisitor;

impl<'de> Visitor<'de> for EntryMapVisitor {
    type Value = EntryMap;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("an object mapping entry ids to entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EntryMap, A::Error> {
        let mut map = EntryMap::new();
        while let Some((key, entry)) = access.next_entry::<String, Entry>()? {
            if key != entry.id {
                return Err(de::Error::custom(format!(
                    "key `{key}` does not match entry id `{}`",
                    entry.id
                )));
            }
            entry.validate().map_err(A::Error::custom)?;
            map.push(entry).map_err(|dup| {
                A::Error::custom(format!("duplicate entry id `{}`", dup.id))
            })?;
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::EntryMap;
    use crate::model::entry::Entry;
    use chrono::Utc;

    fn entry(id: &str) -> Entry {
        Entry::new(id, id, "body", ["x"], Utc::now())
    }

    #[test]
    fn remove_then_restore_keeps_original_position() {
        let mut map = EntryMap::new();
        for id in ["a", "b", "c"] {
            map.push(entry(id)).unwrap();
        }

        let (index, removed) = map.remove("b").unwrap();
        assert_eq!(index, 1);
        map.restore(index, removed);

        let ids: Vec<_> = map.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn push_rejects_duplicate_id() {
        let mut map = EntryMap::new();
        map.push(entry("a")).unwrap();
        assert!(map.push(entry("a")).is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn serialized_object_keeps_insertion_order() {
        let mut map = EntryMap::new();
        for id in ["zeta", "alpha"] {
            map.push(entry(id)).unwrap();
        }

        let json = serde_json::to_string(&map).unwrap();
        let zeta = json.find("\"zeta\":").unwrap();
        let alpha = json.find("\"alpha\":").unwrap();
        assert!(zeta < alpha);

        let decoded: EntryMap = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, map);
    }
}
