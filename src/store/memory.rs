use super::{Document, DocumentStore, StoreError, document_segments};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process document store keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        document_segments(path)?;
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: Document) -> Result<(), StoreError> {
        document_segments(path)?;
        self.documents.write().await.insert(path.to_string(), value);
        Ok(())
    }
}
