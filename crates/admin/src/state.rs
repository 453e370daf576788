//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{AdminConfig, StoreBackend, StoreConfig};
use crate::error::AppError;
use crate::services::{CatalogService, OrderService, StoreSync};
use crate::store::{DynDocumentStore, MemoryStore, PgDocumentStore, StoreError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The store handle is optional:
/// when it could not be obtained at startup, pages render empty and every
/// write answers 503.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Option<DynDocumentStore>,
    sync: StoreSync,
}

impl AppState {
    /// Assemble state from parts.
    #[must_use]
    pub fn new(config: AdminConfig, store: Option<DynDocumentStore>, sync: StoreSync) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                sync,
            }),
        }
    }

    /// Open the configured store and start mirroring it.
    ///
    /// Never fails: a store that cannot be reached is logged and the admin
    /// starts with empty views.
    pub async fn connect(config: AdminConfig) -> Self {
        let store = match open_store(&config.store).await {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!(error = %e, "Failed to open document store, starting with empty views");
                None
            }
        };
        Self::with_store(config, store).await
    }

    /// Start mirroring an already opened store.
    pub async fn with_store(config: AdminConfig, store: Option<DynDocumentStore>) -> Self {
        let sync = match &store {
            Some(store) => match StoreSync::start(store.as_ref(), &config.store).await {
                Ok(sync) => sync,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to subscribe to collections");
                    StoreSync::new()
                }
            },
            None => StoreSync::new(),
        };
        Self::new(config, store, sync)
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the store handle.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if no store was opened at startup.
    pub fn store(&self) -> Result<&DynDocumentStore, AppError> {
        self.inner
            .store
            .as_ref()
            .ok_or(AppError::Store(StoreError::Unavailable))
    }

    /// Get the live mirror.
    #[must_use]
    pub fn sync(&self) -> &StoreSync {
        &self.inner.sync
    }

    /// Catalog commands against the configured `products` collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if no store was opened at startup.
    pub fn catalog(&self) -> Result<CatalogService, AppError> {
        Ok(CatalogService::new(
            Arc::clone(self.store()?),
            self.config().store.products(),
        ))
    }

    /// Order commands against the configured `orders` collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if no store was opened at startup.
    pub fn orders(&self) -> Result<OrderService, AppError> {
        Ok(OrderService::new(
            Arc::clone(self.store()?),
            self.config().store.orders(),
        ))
    }
}

/// Open the backend named in `config`.
///
/// # Errors
///
/// Returns `StoreError` if the backend cannot be reached.
pub async fn open_store(config: &StoreConfig) -> Result<DynDocumentStore, StoreError> {
    match &config.backend {
        StoreBackend::Postgres { database_url } => {
            let store = PgDocumentStore::connect(database_url).await?;
            tracing::info!("Connected to PostgreSQL document store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
