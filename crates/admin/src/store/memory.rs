//! In-process document store.
//!
//! Each collection keeps its documents in insertion order plus a
//! `tokio::sync::watch` channel holding the latest snapshot. Subscribers
//! receive the current value immediately and every later replacement.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use popeyon_core::{Document, Fields};

use super::{
    CollectionPath, DocumentStore, Snapshot, SnapshotHandler, StoreError, Subscription,
};

struct MemoryCollection {
    documents: Vec<Document>,
    feed: watch::Sender<Snapshot>,
}

impl MemoryCollection {
    fn new() -> Self {
        let (feed, _) = watch::channel(Snapshot::default());
        Self {
            documents: Vec::new(),
            feed,
        }
    }

    fn publish(&self) {
        self.feed.send_replace(Snapshot::new(self.documents.clone()));
    }
}

/// Document store kept entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<CollectionPath, MemoryCollection>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CollectionPath, MemoryCollection>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against a collection, creating it on first use.
    fn with_collection<T>(
        &self,
        path: &CollectionPath,
        f: impl FnOnce(&mut MemoryCollection) -> T,
    ) -> T {
        let mut collections = self.lock();
        let collection = collections
            .entry(path.clone())
            .or_insert_with(MemoryCollection::new);
        f(collection)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, path: &CollectionPath, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.with_collection(path, |collection| {
            collection.documents.push(Document::new(id.clone(), fields));
            collection.publish();
        });
        tracing::debug!(path = %path, id = %id, "Inserted document");
        Ok(id)
    }

    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.with_collection(path, |collection| {
            let doc = collection
                .documents
                .iter_mut()
                .find(|doc| doc.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            doc.fields.extend(fields);
            collection.publish();
            Ok(())
        })
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        self.with_collection(path, |collection| {
            let before = collection.documents.len();
            collection.documents.retain(|doc| doc.id != id);
            if collection.documents.len() == before {
                tracing::debug!(path = %path, id = %id, "Delete of missing document ignored");
            } else {
                collection.publish();
            }
        });
        Ok(())
    }

    async fn snapshot(&self, path: &CollectionPath) -> Result<Snapshot, StoreError> {
        Ok(self.with_collection(path, |collection| {
            Snapshot::new(collection.documents.clone())
        }))
    }

    async fn subscribe(
        &self,
        path: &CollectionPath,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        let mut rx = self.with_collection(path, |collection| collection.feed.subscribe());

        let task = tokio::spawn(async move {
            loop {
                let snapshot = rx.borrow_and_update().clone();
                handler(snapshot);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Ok(Subscription::new(path.clone(), task))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
