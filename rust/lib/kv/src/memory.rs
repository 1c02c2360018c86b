use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::StoreError;
use crate::merge::merge_patch;
use crate::traits::DocStore;

/// MemoryStore is a DocStore held entirely in a `BTreeMap`.
///
/// Used by tests and by ephemeral dev servers. Every operation takes the
/// whole-map lock, which trivially gives the same single-document
/// atomicity the redb backend provides via write transactions.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.docs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let docs = self.docs.read().unwrap();
        Ok(docs.get(key).cloned())
    }

    fn set(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap();
        docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn create(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap();
        if docs.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn update(&self, key: &str, patch: &Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap();
        let base = docs
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        merge_patch(base, patch);
        Ok(())
    }

    fn merge_create(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap();
        match docs.get_mut(key) {
            Some(base) => merge_patch(base, doc),
            None => {
                docs.insert(key.to_string(), doc.clone());
            }
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap();
        docs.remove(key);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let docs = self.docs.read().unwrap();
        let range = docs.range::<String, _>((Bound::Included(prefix.to_string()), Bound::Unbounded));
        Ok(range
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_fails_on_existing_key() {
        let store = MemoryStore::new();
        store.create("t:profile:u1", &json!({"id": "u1"})).unwrap();
        let err = store.create("t:profile:u1", &json!({"id": "u1"})).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_fails_on_absent_key() {
        let store = MemoryStore::new();
        let err = store.update("t:profile:u1", &json!({"email": "a@x.com"})).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        // The failed update must not have created a partial document.
        assert!(store.get("t:profile:u1").unwrap().is_none());
    }

    #[test]
    fn update_merges_patch() {
        let store = MemoryStore::new();
        store.set("k", &json!({"a": 1, "b": 2})).unwrap();
        store.update("k", &json!({"b": 3, "c": 4})).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn merge_create_creates_then_patches() {
        let store = MemoryStore::new();
        store.merge_create("k", &json!({"a": 1})).unwrap();
        store.merge_create("k", &json!({"b": 2})).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn scan_is_prefix_bounded_and_sorted() {
        let store = MemoryStore::new();
        store.set("t:profile:u2", &json!({"id": "u2"})).unwrap();
        store.set("t:profile:u1", &json!({"id": "u1"})).unwrap();
        store.set("t:salon:s1", &json!({"id": "s1"})).unwrap();
        let result = store.scan("t:profile:").unwrap();
        let keys: Vec<_> = result.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["t:profile:u1", "t:profile:u2"]);
    }

    #[test]
    fn scan_range_filters_field_and_caps() {
        let store = MemoryStore::new();
        for (uid, email) in [("u1", "alice@x.com"), ("u2", "bob@x.com"), ("u3", "anna@x.com")] {
            store
                .set(&format!("t:profile:{uid}"), &json!({"id": uid, "email": email}))
                .unwrap();
        }
        // No email field at all — must be skipped, not an error.
        store.set("t:profile:u4", &json!({"id": "u4"})).unwrap();

        let hits = store
            .scan_range("t:profile:", "email", "a", "a\u{f8ff}", 10)
            .unwrap();
        assert_eq!(hits.len(), 2);
        for (_, doc) in &hits {
            assert!(doc["email"].as_str().unwrap().starts_with('a'));
        }

        let capped = store
            .scan_range("t:profile:", "email", "a", "z", 2)
            .unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("k", &json!({"a": 1})).unwrap();
        store.delete("k").unwrap();
        store.delete("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
