use crate::model::CollectionName;
use anyhow::Result;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document for collection '{collection}' must be a JSON object, got {kind}")]
    NotAnObject {
        collection: String,
        kind: &'static str,
    },
}

/// Reject anything that is not a JSON object before it reaches the store
pub fn ensure_object(collection: &CollectionName, document: &Value) -> Result<(), DocumentError> {
    let kind = match document {
        Value::Object(_) => return Ok(()),
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
    };

    Err(DocumentError::NotAnObject {
        collection: collection.to_string(),
        kind,
    })
}

/// Collection-oriented document store.
///
/// Collections spring into existence on first write. Inserts are
/// unconditional: writing the same document twice stores it twice.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &CollectionName, document: Value) -> Result<()>;

    /// Write a batch in a single statement; returns the number of documents written
    async fn insert_many(&self, collection: &CollectionName, documents: Vec<Value>) -> Result<u64>;

    /// All documents of a collection in insertion order, empty if it was never written
    async fn list_documents(&self, collection: &CollectionName) -> Result<Vec<Value>>;

    async fn count_documents(&self, collection: &CollectionName) -> Result<u64>;
}
