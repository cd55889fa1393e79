//! # In-Memory Document Store
//!
//! Keeps every collection in process memory. Used by the `memory` storage
//! mode and by tests, which can also inspect the write log and switch on
//! read/write failures.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{Document, DocumentStore, Fields};

/// A write that reached the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    Create { collection: String, key: String, fields: Fields },
    Update { collection: String, key: String, patch: Fields },
}

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
    writes: Arc<Mutex<Vec<StoreWrite>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document without recording it in the write log
    pub fn seed(&self, collection: &str, key: &str, fields: Fields) {
        let mut collections = self.lock_collections();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), fields);
    }

    /// Every create/update accepted so far, oldest first
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.lock_writes().clone()
    }

    /// Make every subsequent read fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock_collections(&self) -> MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_writes(&self) -> MutexGuard<'_, Vec<StoreWrite>> {
        self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("document store unavailable for reads"));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("document store unavailable for writes"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.check_reads()?;
        let collections = self.lock_collections();
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, fields)| Document { key: key.clone(), fields: fields.clone() })
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        self.check_reads()?;
        let collections = self.lock_collections();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|fields| Document { key: key.to_string(), fields: fields.clone() }))
    }

    async fn create(&self, collection: &str, key: &str, fields: Fields) -> Result<()> {
        self.check_writes()?;
        {
            let mut collections = self.lock_collections();
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(key.to_string(), fields.clone());
        }
        debug!("Created {}/{}", collection, key);
        self.lock_writes().push(StoreWrite::Create {
            collection: collection.to_string(),
            key: key.to_string(),
            fields,
        });
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, patch: Fields) -> Result<()> {
        self.check_writes()?;
        {
            let mut collections = self.lock_collections();
            let document = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(key))
                .ok_or_else(|| anyhow!("No document {}/{} to update", collection, key))?;
            for (field, value) in &patch {
                document.insert(field.clone(), value.clone());
            }
        }
        debug!("Updated {}/{}", collection, key);
        self.lock_writes().push(StoreWrite::Update {
            collection: collection.to_string(),
            key: key.to_string(),
            patch,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryDocumentStore::new();
        store
            .create("days", "2025-01-01", fields(json!({"expense": 1, "gym": false})))
            .await
            .unwrap();
        store.update("days", "2025-01-01", fields(json!({"gym": true}))).await.unwrap();

        let doc = store.get("days", "2025-01-01").await.unwrap().unwrap();
        assert_eq!(doc.fields["expense"], json!(1));
        assert_eq!(doc.fields["gym"], json!(true));
        assert_eq!(store.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_recovered() {
        let store = InMemoryDocumentStore::new();
        store.seed("days", "2025-01-01", fields(json!({"expense": 1})));

        let collections = store.collections.clone();
        let _ = std::thread::spawn(move || {
            let _guard = collections.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(store.collections.is_poisoned());

        store.update("days", "2025-01-01", fields(json!({"gym": true}))).await.unwrap();
        let doc = store.get("days", "2025-01-01").await.unwrap().unwrap();
        assert_eq!(doc.fields["gym"], json!(true));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = InMemoryDocumentStore::new();
        let result = store.update("days", "2025-01-01", fields(json!({"gym": true}))).await;
        assert!(result.is_err());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_is_key_ordered() {
        let store = InMemoryDocumentStore::new();
        store.seed("days", "2025-01-12", Fields::new());
        store.seed("days", "2025-01-05", Fields::new());
        store.seed("other", "x", Fields::new());

        let keys: Vec<String> = store
            .get_all("days")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.key)
            .collect();
        assert_eq!(keys, vec!["2025-01-05", "2025-01-12"]);
        assert!(store.get_all("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let store = InMemoryDocumentStore::new();
        store.set_fail_reads(true);
        assert!(store.get_all("days").await.is_err());
        store.set_fail_reads(false);

        store.set_fail_writes(true);
        assert!(store.create("days", "k", Fields::new()).await.is_err());
        assert!(store.get("days", "k").await.unwrap().is_none());
    }
}
