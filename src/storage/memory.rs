use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::DocumentStore;
use crate::error::AppResult;

/// Process-local document store, used for dry runs and tests.
///
/// Documents keep their insertion order within a collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<BTreeMap<String, Vec<(String, Value)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored document, grouped by collection path.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<(String, Value)>> {
        self.lock().clone()
    }

    pub fn document_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<(String, Value)>>> {
        // A poisoned lock only means another test thread panicked mid-insert.
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set_document(&self, collection: &str, id: &str, data: Value) -> AppResult<()> {
        let mut collections = self.lock();
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some((_, existing)) => *existing = data,
            None => docs.push((id.to_string(), data)),
        }

        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        Ok(self.lock().get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, data)| data.clone())
        }))
    }

    async fn list_documents(&self, collection: &str) -> AppResult<Vec<(String, Value)>> {
        Ok(self.lock().get(collection).cloned().unwrap_or_default())
    }
}
