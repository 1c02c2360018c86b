use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::merge::merge_patch;
use crate::traits::DocStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("docs");

/// RedbStore is a DocStore implementation backed by redb — a pure-Rust
/// embedded key-value database. Documents are stored as serialized JSON.
///
/// Each conditional operation (`create`, `update`, `merge_create`) reads
/// and writes inside a single write transaction, so the read-then-branch
/// is atomic with respect to concurrent callers on the same document.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::Storage(e.to_string()))?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        debug!("opened doc store at {}", path.display());
        Ok(Self { db: Arc::new(db) })
    }
}

fn encode(doc: &Value) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Value, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl DocStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(decode(val.value())?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let bytes = encode(doc)?;
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            table
                .insert(key, bytes.as_slice())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn create(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let bytes = encode(doc)?;
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let existing = table
                .get(key)
                .map_err(|e| StoreError::Storage(e.to_string()))?
                .is_some();
            if existing {
                return Err(StoreError::AlreadyExists(key.to_string()));
            }
            table
                .insert(key, bytes.as_slice())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn update(&self, key: &str, patch: &Value) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let mut doc = {
                let current = table
                    .get(key)
                    .map_err(|e| StoreError::Storage(e.to_string()))?
                    .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
                decode(current.value())?
            };
            merge_patch(&mut doc, patch);
            let bytes = encode(&doc)?;
            table
                .insert(key, bytes.as_slice())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn merge_create(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let current = {
                let existing = table
                    .get(key)
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
                match existing {
                    Some(val) => Some(decode(val.value())?),
                    None => None,
                }
            };
            let merged = match current {
                Some(mut base) => {
                    merge_patch(&mut base, doc);
                    base
                }
                None => doc.clone(),
            };
            let bytes = encode(&merged)?;
            table
                .insert(key, bytes.as_slice())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        let iter = table
            .range(prefix..)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        for entry in iter {
            let (key, val) = entry.map_err(|e| StoreError::Storage(e.to_string()))?;
            let key = key.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key, decode(val.value())?));
        }
        Ok(results)
    }
}
