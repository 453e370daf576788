//! Document store seam.
//!
//! Products and orders live in a remote document store. Everything the admin
//! needs from it goes through [`DocumentStore`]: insert, update, delete, a
//! one-off snapshot, and a change feed that delivers the full collection on
//! every change.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local, used for development and tests
//! - [`PgDocumentStore`] - JSONB rows in `PostgreSQL`, change feed over
//!   `LISTEN/NOTIFY`
//!
//! # Paths
//!
//! Every collection is scoped to one tenant and one admin user:
//!
//! ```text
//! artifacts/{tenant}/users/{owner}/products
//! artifacts/{tenant}/users/{owner}/orders
//! ```

mod memory;
mod postgres;
#[cfg(test)]
pub(crate) mod recording;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use popeyon_core::{Document, Fields};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document does not exist.
    #[error("document {0} not found")]
    NotFound(String),

    /// No store handle could be obtained.
    #[error("document store unavailable")]
    Unavailable,
}

/// The two collections the admin works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Orders,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
        }
    }
}

/// Fully qualified collection path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    #[must_use]
    pub fn new(tenant_id: &str, owner_id: &str, collection: Collection) -> Self {
        Self(format!(
            "artifacts/{tenant_id}/users/{owner_id}/{}",
            collection.as_str()
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full contents of a collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    documents: Arc<[Document]>,
}

impl Snapshot {
    #[must_use]
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: documents.into(),
        }
    }

    /// Documents in the order the store returned them.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Callback invoked with each new snapshot.
pub type SnapshotHandler = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// A live change-feed subscription.
///
/// The handler stops being called once the subscription is cancelled or
/// dropped.
#[derive(Debug)]
pub struct Subscription {
    path: CollectionPath,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap the task that drives a change feed.
    #[must_use]
    pub const fn new(path: CollectionPath, task: JoinHandle<()>) -> Self {
        Self {
            path,
            task: Some(task),
        }
    }

    #[must_use]
    pub const fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Whether the feed task is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the feed and wait for its task to wind down.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::debug!(path = %self.path, "Unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Create, update, delete and watch documents in a collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document; the store assigns and returns its identifier.
    async fn insert(&self, path: &CollectionPath, fields: Fields) -> Result<String, StoreError>;

    /// Merge `fields` into an existing document, leaving other fields as they are.
    ///
    /// Fails with `StoreError::NotFound` if the document does not exist.
    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Remove a document. Removing a missing document is not an error.
    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError>;

    /// Current contents of a collection.
    async fn snapshot(&self, path: &CollectionPath) -> Result<Snapshot, StoreError>;

    /// Watch a collection.
    ///
    /// `handler` receives the current snapshot right away and a fresh one
    /// after every change, until the returned subscription is dropped.
    async fn subscribe(
        &self,
        path: &CollectionPath,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Shared handle to whichever backend is configured.
pub type DynDocumentStore = Arc<dyn DocumentStore>;
