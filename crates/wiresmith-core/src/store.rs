//! In-memory mapping store keyed by mapping id.

use crate::mapping::Mapping;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Mapping not found: {0}")]
    NotFound(String),
    #[error("Mapping with id {0} already exists")]
    DuplicateId(String),
}

struct Entry {
    /// Insertion sequence, used to list in creation order.
    seq: u64,
    mapping: Mapping,
}

/// Thread-safe keyed collection of mappings.
///
/// Listing returns mappings in the order they were first created; updates keep
/// a mapping's position.
#[derive(Default)]
pub struct MappingStore {
    mappings: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a mapping, assigning a fresh id when it has none.
    pub fn create(&self, mut mapping: Mapping) -> Result<Mapping, StoreError> {
        if mapping.id.is_empty() {
            mapping.id = Uuid::new_v4().to_string();
        }

        let mut mappings = self.mappings.write();
        if mappings.contains_key(&mapping.id) {
            return Err(StoreError::DuplicateId(mapping.id));
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        debug!(mapping_id = %mapping.id, "Stored mapping");
        mappings.insert(
            mapping.id.clone(),
            Entry {
                seq,
                mapping: mapping.clone(),
            },
        );
        Ok(mapping)
    }

    /// Store a batch atomically. Ids are checked against the store and
    /// against each other before anything is inserted, so a conflict leaves
    /// the store untouched.
    pub fn create_all(&self, mut batch: Vec<Mapping>) -> Result<Vec<Mapping>, StoreError> {
        for mapping in batch.iter_mut().filter(|m| m.id.is_empty()) {
            mapping.id = Uuid::new_v4().to_string();
        }

        let mut mappings = self.mappings.write();
        let mut seen = HashSet::with_capacity(batch.len());
        for mapping in &batch {
            if mappings.contains_key(&mapping.id) || !seen.insert(mapping.id.as_str()) {
                return Err(StoreError::DuplicateId(mapping.id.clone()));
            }
        }

        for mapping in &batch {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            mappings.insert(
                mapping.id.clone(),
                Entry {
                    seq,
                    mapping: mapping.clone(),
                },
            );
        }
        debug!(count = batch.len(), "Stored mapping batch");
        Ok(batch)
    }

    pub fn get(&self, id: &str) -> Option<Mapping> {
        self.mappings.read().get(id).map(|e| e.mapping.clone())
    }

    /// Replace an existing mapping. The stored id is always `id`.
    pub fn update(&self, id: &str, mut mapping: Mapping) -> Result<Mapping, StoreError> {
        let mut mappings = self.mappings.write();
        let entry = mappings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        mapping.id = id.to_string();
        entry.mapping = mapping.clone();
        debug!(mapping_id = %id, "Updated mapping");
        Ok(mapping)
    }

    /// Returns `true` if a mapping was removed.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.mappings.write().remove(id).is_some();
        if removed {
            debug!(mapping_id = %id, "Deleted mapping");
        }
        removed
    }

    pub fn list(&self) -> Vec<Mapping> {
        let mappings = self.mappings.read();
        let mut entries: Vec<&Entry> = mappings.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.mapping.clone()).collect()
    }

    /// Remove everything, returning how many mappings were dropped.
    pub fn clear(&self) -> usize {
        let mut mappings = self.mappings.write();
        let count = mappings.len();
        mappings.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.mappings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HttpMethod;
    use crate::mapping::{MappingRequest, MappingResponse, UrlMatcher};
    use std::sync::Arc;

    fn mapping(id: &str, url: &str) -> Mapping {
        Mapping {
            id: id.to_string(),
            name: None,
            priority: None,
            request: MappingRequest::new(HttpMethod::Get, Some(UrlMatcher::Url(url.into()))),
            response: MappingResponse::new(200),
            scenario_name: None,
            required_scenario_state: None,
            new_scenario_state: None,
            metadata: None,
        }
    }

    #[test]
    fn test_create_assigns_id() {
        let store = MappingStore::new();
        let stored = store.create(mapping("", "/a")).unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(store.get(&stored.id), Some(stored));
    }

    #[test]
    fn test_create_rejects_duplicate() {
        let store = MappingStore::new();
        store.create(mapping("a", "/a")).unwrap();
        assert_eq!(
            store.create(mapping("a", "/b")),
            Err(StoreError::DuplicateId("a".into()))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_keeps_creation_order() {
        let store = MappingStore::new();
        for id in ["c", "a", "b"] {
            store.create(mapping(id, "/")).unwrap();
        }
        store.update("a", mapping("ignored", "/changed")).unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(
            store.get("a").unwrap().request.url,
            Some(UrlMatcher::Url("/changed".into()))
        );
    }

    #[test]
    fn test_update_missing() {
        let store = MappingStore::new();
        assert_eq!(
            store.update("nope", mapping("nope", "/")),
            Err(StoreError::NotFound("nope".into()))
        );
    }

    #[test]
    fn test_delete_and_clear() {
        let store = MappingStore::new();
        store.create_all(vec![mapping("a", "/a"), mapping("b", "/b")]).unwrap();

        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert_eq!(store.clear(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_all_assigns_ids_in_order() {
        let store = MappingStore::new();
        store.create(mapping("first", "/")).unwrap();
        let stored = store.create_all(vec![mapping("", "/a"), mapping("b", "/b")]).unwrap();

        assert!(!stored[0].id.is_empty());
        let ids: Vec<String> = store.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["first".to_string(), stored[0].id.clone(), "b".to_string()]);
    }

    #[test]
    fn test_create_all_conflict_with_stored_id_inserts_nothing() {
        let store = MappingStore::new();
        store.create(mapping("x", "/x")).unwrap();

        let result = store.create_all(vec![mapping("a", "/a"), mapping("x", "/other")]);
        assert_eq!(result, Err(StoreError::DuplicateId("x".into())));
        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_none());
        assert_eq!(store.get("x").unwrap().request.url, Some(UrlMatcher::Url("/x".into())));
    }

    #[test]
    fn test_create_all_conflict_within_batch_inserts_nothing() {
        let store = MappingStore::new();
        let result = store.create_all(vec![mapping("a", "/a"), mapping("b", "/b"), mapping("a", "/c")]);
        assert_eq!(result, Err(StoreError::DuplicateId("a".into())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_creates() {
        let store = Arc::new(MappingStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.create(mapping("", "/")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
