//! Store wrapper that records every write, for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use popeyon_core::Fields;

use super::{
    CollectionPath, DocumentStore, MemoryStore, Snapshot, SnapshotHandler, StoreError,
    Subscription,
};

/// A write that reached the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert(Fields),
    Update(String, Fields),
    Delete(String),
}

/// `MemoryStore` that also logs calls.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<Call>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn insert(&self, path: &CollectionPath, fields: Fields) -> Result<String, StoreError> {
        self.record(Call::Insert(fields.clone()));
        self.inner.insert(path, fields).await
    }

    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.record(Call::Update(id.to_string(), fields.clone()));
        self.inner.update(path, id, fields).await
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        self.record(Call::Delete(id.to_string()));
        self.inner.delete(path, id).await
    }

    async fn snapshot(&self, path: &CollectionPath) -> Result<Snapshot, StoreError> {
        self.inner.snapshot(path).await
    }

    async fn subscribe(
        &self,
        path: &CollectionPath,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        self.inner.subscribe(path, handler).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
