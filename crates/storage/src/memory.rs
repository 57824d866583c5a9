//! In-process document store, used when PostgreSQL is not configured and in tests.

use std::collections::HashSet;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use coverdesk_core::{business_key, Record, STORAGE_KEY};

use crate::error::StorageError;
use crate::traits::DocumentStore;

pub struct MemoryStore {
    collection: String,
    docs: RwLock<IndexMap<String, Record>>,
}

impl MemoryStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            docs: RwLock::new(IndexMap::new()),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

/// Copy of `record` with a fresh storage key in front and any incoming `_id` dropped.
fn with_storage_key(record: &Record) -> Record {
    let mut doc = Record::new();
    doc.insert(STORAGE_KEY.to_string(), Value::String(Uuid::new_v4().to_string()));
    for (field, value) in record {
        if field != STORAGE_KEY {
            doc.insert(field.clone(), value.clone());
        }
    }
    doc
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Record>, StorageError> {
        Ok(self.docs.read().await.get(key).cloned())
    }

    async fn insert_many(&self, records: &[Record]) -> Result<usize, StorageError> {
        let mut docs = self.docs.write().await;

        // Validate the whole batch before touching the map.
        let mut batch_keys = HashSet::with_capacity(records.len());
        for record in records {
            let key = business_key(record).ok_or(StorageError::MissingKey)?;
            if docs.contains_key(key) || !batch_keys.insert(key) {
                return Err(StorageError::DuplicateKey(key.to_string()));
            }
        }

        for record in records {
            if let Some(key) = business_key(record) {
                docs.insert(key.to_string(), with_storage_key(record));
            }
        }
        Ok(records.len())
    }

    async fn update_by_key(&self, key: &str, fields: &Record) -> Result<(), StorageError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        for (field, value) in fields {
            if field != STORAGE_KEY {
                doc.insert(field.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Record>, StorageError> {
        Ok(self.docs.read().await.values().cloned().collect())
    }

    async fn search_by_name(&self, needle: &str) -> Result<Vec<Record>, StorageError> {
        let needle = needle.to_lowercase();
        let docs = self.docs.read().await;
        Ok(docs
            .values()
            .filter(|doc| {
                doc.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn delete_by_key(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.docs.write().await.shift_remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryStore::new("packages");
        let n = store
            .insert_many(&[record(json!({"id": "pkg1", "name": "Basic"}))])
            .await
            .unwrap();
        assert_eq!(n, 1);

        let doc = store.find_by_key("pkg1").await.unwrap().unwrap();
        assert_eq!(doc["name"], json!("Basic"));
        assert!(doc[STORAGE_KEY].is_string());
        assert!(store.find_by_key("pkg2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn client_storage_key_is_replaced() {
        let store = MemoryStore::new("packages");
        store
            .insert_many(&[record(json!({"_id": "client-chosen", "id": "pkg1"}))])
            .await
            .unwrap();
        let doc = store.find_by_key("pkg1").await.unwrap().unwrap();
        assert_ne!(doc[STORAGE_KEY], json!("client-chosen"));
    }

    #[tokio::test]
    async fn batch_is_all_or_nothing() {
        let store = MemoryStore::new("packages");
        store.insert_many(&[record(json!({"id": "pkg1"}))]).await.unwrap();

        let err = store
            .insert_many(&[record(json!({"id": "pkg2"})), record(json!({"id": "pkg1"}))])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(ref k) if k == "pkg1"));
        assert!(store.find_by_key("pkg2").await.unwrap().is_none());

        let err = store
            .insert_many(&[record(json!({"id": "pkg3"})), record(json!({"name": "no key"}))])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingKey));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_within_batch_rejected() {
        let store = MemoryStore::new("packages");
        let err = store
            .insert_many(&[record(json!({"id": "pkg1"})), record(json!({"id": "pkg1"}))])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryStore::new("packages");
        store
            .insert_many(&[record(json!({"id": "pkg1", "name": "Basic", "minAge": 1}))])
            .await
            .unwrap();
        let before = store.find_by_key("pkg1").await.unwrap().unwrap();

        store
            .update_by_key("pkg1", &record(json!({"_id": "x", "id": "pkg1", "name": "Premium"})))
            .await
            .unwrap();

        let doc = store.find_by_key("pkg1").await.unwrap().unwrap();
        assert_eq!(doc["name"], json!("Premium"));
        assert_eq!(doc["minAge"], json!(1));
        assert_eq!(doc[STORAGE_KEY], before[STORAGE_KEY]);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new("packages");
        let err = store
            .update_by_key("ghost", &record(json!({"name": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_list_delete() {
        let store = MemoryStore::new("packages");
        store
            .insert_many(&[
                record(json!({"id": "pkg1", "name": "Health Happy Kid"})),
                record(json!({"id": "pkg2", "name": "Senior Care"})),
                record(json!({"id": "pkg3"})),
            ])
            .await
            .unwrap();

        let hits = store.search_by_name("happy").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], json!("pkg1"));
        assert_eq!(store.search_by_name("").await.unwrap().len(), 2);

        assert!(store.delete_by_key("pkg2").await.unwrap());
        assert!(!store.delete_by_key("pkg2").await.unwrap());

        let ids: Vec<Value> = store.list().await.unwrap().iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!("pkg1"), json!("pkg3")]);
    }
}
