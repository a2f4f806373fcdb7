//! In-memory document store for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    docs: RwLock<HashMap<(Collection, String), Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document. `fields` must be a JSON object; any
    /// other value is stored as an empty document.
    pub async fn put(&self, collection: Collection, id: impl Into<String>, fields: serde_json::Value) {
        let doc = match fields {
            serde_json::Value::Object(map) => map,
            _ => Document::new(),
        };
        self.docs.write().await.insert((collection, id.into()), doc);
    }

    pub async fn remove(&self, collection: Collection, id: &str) -> Option<Document> {
        self.docs
            .write()
            .await
            .remove(&(collection, id.to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .docs
            .read()
            .await
            .get(&(collection, id.to_string()))
            .cloned())
    }
}
