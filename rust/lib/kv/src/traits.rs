use serde_json::Value;

use crate::error::StoreError;

/// DocStore provides a key-addressed JSON document storage interface.
///
/// Keys follow a namespaced convention: `acme:profile:u123`,
/// `acme:salon:8f2c...`, etc. Each method that touches a single document
/// is atomic and strongly consistent for that document; there is no
/// atomicity guarantee across two documents.
pub trait DocStore: Send + Sync {
    /// Get the document for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Set a document unconditionally, creating or overwriting.
    fn set(&self, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Create a document only if the key is absent.
    ///
    /// Returns `StoreError::AlreadyExists` if the key is present. This is
    /// the conditional-create primitive that removes the read-then-branch
    /// race on first writes.
    fn create(&self, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Merge a partial document into an existing one (RFC 7386).
    ///
    /// Fails with `StoreError::NotFound` if the key is absent, so a
    /// field-level update can never accidentally re-create a document
    /// with partial data.
    fn update(&self, key: &str, patch: &Value) -> Result<(), StoreError>;

    /// Create the document if absent, otherwise merge-patch it.
    fn merge_create(&self, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Scan all documents whose key matches a prefix.
    /// Returns (key, doc) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Range scan over a string field of the documents under `prefix`.
    ///
    /// Returns documents whose `field` value `v` satisfies `lo <= v < hi`,
    /// in natural key order, capped at `limit`. Documents missing the
    /// field (or holding a non-string there) are skipped.
    fn scan_range(
        &self,
        prefix: &str,
        field: &str,
        lo: &str,
        hi: &str,
        limit: usize,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let mut results = Vec::new();
        for (key, doc) in self.scan(prefix)? {
            let Some(v) = doc.get(field).and_then(|v| v.as_str()) else {
                continue;
            };
            if v >= lo && v < hi {
                results.push((key, doc));
                if results.len() >= limit {
                    break;
                }
            }
        }
        Ok(results)
    }
}
