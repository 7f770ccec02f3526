//! In-memory document store.
//!
//! Backs the `memory:` registry scheme and the test suite. A single
//! `parking_lot::Mutex` guards the document map, which makes `bulk`
//! genuinely atomic: the whole batch is applied under one lock guard, so
//! readers never observe a partially applied batch.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::store::{BoxFuture, BulkOp, DocumentBody, DocumentStore, StoreError};

/// Document store held entirely in process memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<String, DocumentBody>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.docs.lock().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.lock().is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async { Ok(()) })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<DocumentBody>, StoreError>> {
        let doc = self.docs.lock().get(id).cloned();
        Box::pin(async move { Ok(doc) })
    }

    fn put(&self, id: &str, body: DocumentBody) -> BoxFuture<'_, Result<(), StoreError>> {
        self.docs.lock().insert(id.to_string(), body);
        Box::pin(async { Ok(()) })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let existed = self.docs.lock().remove(id).is_some();
        Box::pin(async move { Ok(existed) })
    }

    fn bulk(&self, ops: Vec<BulkOp>) -> BoxFuture<'_, Result<(), StoreError>> {
        let mut docs = self.docs.lock();
        for op in ops {
            match op {
                BulkOp::Put { id, body } => {
                    docs.insert(id, body);
                }
                BulkOp::Delete { id } => {
                    docs.remove(&id);
                }
            }
        }
        drop(docs);
        Box::pin(async { Ok(()) })
    }
}
