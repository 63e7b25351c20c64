//! In-memory annotation store.
//!
//! The store is the single source of truth for span text. Document slots hold identifiers;
//! export asks the store for the text behind each one and treats unknown values as literal text.

use annotation_id::{AnnotationId, AnnotationIdGenerator};
use scievent_schema::TextResolver;
use serde::Serialize;
use std::collections::HashMap;

/// A registered span: its (trimmed) text and character offsets in the event `Text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl AnnotationRecord {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            text: text.trim().to_string(),
            start,
            end,
        }
    }
}

/// Table of annotation records keyed by identifier.
///
/// Lookups take `&str` so values read straight out of document slots can be used as keys.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    records: HashMap<AnnotationId, AnnotationRecord>,
    ids: AnnotationIdGenerator,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a span and returns its freshly minted identifier.
    ///
    /// Leading and trailing whitespace is trimmed from `text`; the offsets are stored as given.
    pub fn add(&mut self, text: &str, start: usize, end: usize) -> AnnotationId {
        let id = self.ids.next_id();
        self.records
            .insert(id.clone(), AnnotationRecord::new(text, start, end));
        tracing::debug!(%id, start, end, "Registered annotation");
        id
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Removes a record. Removing an unknown identifier is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<AnnotationRecord> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            tracing::debug!(id, "Removed annotation");
        }
        removed
    }

    /// Replaces an existing record in place.
    ///
    /// Returns `false`, leaving the store unchanged, if `id` is not registered.
    pub fn update(&mut self, id: &str, text: &str, start: usize, end: usize) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                *record = AnnotationRecord::new(text, start, end);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All records in mint order.
    pub fn list_all(&self) -> Vec<(&AnnotationId, &AnnotationRecord)> {
        let mut all: Vec<_> = self.records.iter().collect();
        all.sort_by_key(|(id, _)| id.timestamp());
        all
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TextResolver for AnnotationStore {
    fn resolve(&self, value: &str) -> Option<&str> {
        self.get(value).map(|record| record.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_trims_and_returns_canonical_id() {
        let mut store = AnnotationStore::new();
        let id = store.add("  chase ", 5, 10);

        assert!(AnnotationId::is_canonical(id.as_str()));
        let record = store.get(id.as_str()).unwrap();
        assert_eq!(record.text, "chase");
        assert_eq!((record.start, record.end), (5, 10));
    }

    #[test]
    fn add_keeps_internal_whitespace() {
        let mut store = AnnotationStore::new();
        let id = store.add("\tin  the lab\n", 0, 13);
        assert_eq!(store.get(id.as_str()).unwrap().text, "in  the lab");
    }

    #[test]
    fn ids_are_unique() {
        let mut store = AnnotationStore::new();
        let a = store.add("a", 0, 1);
        let b = store.add("b", 1, 2);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = AnnotationStore::new();
        let id = store.add("Cats", 0, 4);

        assert!(store.remove(id.as_str()).is_some());
        assert!(store.remove(id.as_str()).is_none());
        assert!(store.remove("ann_1_nothere").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn update_only_touches_existing_records() {
        let mut store = AnnotationStore::new();
        let id = store.add("Cats", 0, 4);

        assert!(store.update(id.as_str(), " Dogs ", 0, 4));
        assert_eq!(store.get(id.as_str()).unwrap().text, "Dogs");

        assert!(!store.update("ann_1_missing", "x", 0, 1));
        assert!(!store.contains("ann_1_missing"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_all_is_in_mint_order() {
        let mut store = AnnotationStore::new();
        let ids: Vec<_> = (0..5).map(|i| store.add("x", i, i + 1)).collect();

        let listed: Vec<&AnnotationId> = store.list_all().into_iter().map(|(id, _)| id).collect();
        assert_eq!(listed, ids.iter().collect::<Vec<_>>());
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = AnnotationStore::new();
        store.add("a", 0, 1);
        store.clear();
        assert!(store.is_empty());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn resolves_known_ids_only() {
        let mut store = AnnotationStore::new();
        let id = store.add("mice", 11, 15);
        assert_eq!(store.resolve(id.as_str()), Some("mice"));
        assert_eq!(store.resolve("mice"), None);
    }
}
