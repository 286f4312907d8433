use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::{
    kv_store::{KvStore, StorePath},
    storage::StorageResult,
};

/// Process-local store used when no CouchDB is configured.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Value>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn get(&self, path: StorePath) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let value = self
            .entries
            .get(&path.to_string())
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(value) })
    }

    fn set(&self, path: StorePath, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        self.entries.insert(path.to_string(), value);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
