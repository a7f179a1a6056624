use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::CollectionName;
use crate::store::traits::{ensure_object, DocumentStore};

/// In-process document store.
///
/// Used by tests and dry runs. Can be told to behave like an unreachable
/// server, or to reject writes to specific collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<CollectionName, Vec<Value>>>>,
    unavailable: Arc<RwLock<bool>>,
    failing_collections: Arc<RwLock<HashSet<CollectionName>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the server could not be reached
    pub fn unavailable() -> Self {
        Self {
            unavailable: Arc::new(RwLock::new(true)),
            ..Self::default()
        }
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Reject all subsequent writes to `collection`
    pub async fn fail_writes_to(&self, collection: &CollectionName) {
        self.failing_collections
            .write()
            .await
            .insert(collection.clone());
    }

    /// Total number of documents across all collections
    pub async fn total_documents(&self) -> usize {
        self.collections.read().await.values().map(Vec::len).sum()
    }

    async fn check_available(&self) -> Result<()> {
        if *self.unavailable.read().await {
            bail!("memory store is unavailable");
        }
        Ok(())
    }

    async fn check_writable(&self, collection: &CollectionName) -> Result<()> {
        self.check_available().await?;
        if self.failing_collections.read().await.contains(collection) {
            bail!("write to collection '{}' rejected", collection);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &CollectionName, document: Value) -> Result<()> {
        ensure_object(collection, &document)?;
        self.check_writable(collection).await?;

        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .push(document);

        Ok(())
    }

    async fn insert_many(&self, collection: &CollectionName, documents: Vec<Value>) -> Result<u64> {
        if documents.is_empty() {
            return Ok(0);
        }
        for document in &documents {
            ensure_object(collection, document)?;
        }
        self.check_writable(collection).await?;

        let inserted = documents.len() as u64;
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .extend(documents);

        Ok(inserted)
    }

    async fn list_documents(&self, collection: &CollectionName) -> Result<Vec<Value>> {
        self.check_available().await?;

        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_documents(&self, collection: &CollectionName) -> Result<u64> {
        self.check_available().await?;

        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, |documents| documents.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_list_in_order() {
        let store = MemoryStore::new();
        let views = CollectionName::duplication();

        store.insert_one(&views, json!({"view": "a"})).await.unwrap();
        let inserted = store
            .insert_many(&views, vec![json!({"view": "b"}), json!({"view": "c"})])
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.count_documents(&views).await.unwrap(), 3);
        assert_eq!(
            store.list_documents(&views).await.unwrap(),
            vec![json!({"view": "a"}), json!({"view": "b"}), json!({"view": "c"})]
        );
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let collection = CollectionName::new("never_written").unwrap();

        assert!(store.list_documents(&collection).await.unwrap().is_empty());
        assert_eq!(store.count_documents(&collection).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let store = MemoryStore::unavailable();
        let inserted = store
            .insert_many(&CollectionName::duplication(), Vec::new())
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_rejects_non_object_batch_atomically() {
        let store = MemoryStore::new();
        let views = CollectionName::duplication();

        let result = store
            .insert_many(&views, vec![json!({"view": "ok"}), json!("not a document")])
            .await;

        assert!(result.is_err());
        assert_eq!(store.count_documents(&views).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_writes_nothing() {
        let store = MemoryStore::unavailable();
        let metadata = CollectionName::metadata();

        assert!(store.insert_one(&metadata, json!({"pod": "p"})).await.is_err());
        assert!(store.count_documents(&metadata).await.is_err());

        store.set_unavailable(false).await;
        assert_eq!(store.total_documents().await, 0);
    }

    #[tokio::test]
    async fn test_failing_collection() {
        let store = MemoryStore::new();
        let views = CollectionName::duplication();
        store.fail_writes_to(&views).await;

        let err = store
            .insert_one(&views, json!({"view": "x"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("duplication"));

        store
            .insert_one(&CollectionName::metadata(), json!({"pod": "p"}))
            .await
            .unwrap();
        assert_eq!(store.total_documents().await, 1);
    }
}
