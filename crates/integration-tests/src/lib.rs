//! Integration tests for Popeyón.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the in-memory store
//! cargo test -p popeyon-integration-tests
//!
//! # Include the PostgreSQL tests
//! TEST_DATABASE_URL=postgres://localhost/popeyon_test \
//!     cargo test -p popeyon-integration-tests -- --include-ignored
//! ```
//!
//! Requests go through the real router with `tower::ServiceExt::oneshot`; no
//! socket is opened.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use popeyon_admin::config::AdminConfig;
use popeyon_admin::state::AppState;
use popeyon_admin::store::{CollectionPath, DocumentStore, DynDocumentStore, MemoryStore};

/// How long a test waits for the mirror to catch up with a write.
const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// Status, headers and body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// An admin router wired to a fresh in-memory store.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

/// Configuration pointing at the in-memory backend.
#[must_use]
pub fn test_config() -> AdminConfig {
    AdminConfig::from_lookup(|key| match key {
        "STORE_BACKEND" => Some("memory".to_string()),
        "STORE_TENANT_ID" => Some("test-tenant".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

impl TestApp {
    /// Start an app over an empty store and wait for the first snapshots.
    pub async fn new() -> Self {
        let store: DynDocumentStore = Arc::new(MemoryStore::new());
        Self::with_store(Some(store)).await
    }

    /// Start an app as if the store could not be reached.
    pub async fn offline() -> Self {
        Self::with_store(None).await
    }

    async fn with_store(store: Option<DynDocumentStore>) -> Self {
        let has_store = store.is_some();
        let state = AppState::with_store(test_config(), store).await;
        if has_store {
            tokio::time::timeout(SYNC_TIMEOUT, state.sync().ready())
                .await
                .expect("mirror never loaded");
        }
        let router = popeyon_admin::app(state.clone());
        Self { state, router }
    }

    /// The underlying store.
    pub fn store(&self) -> &DynDocumentStore {
        self.state.store().expect("app has a store")
    }

    #[must_use]
    pub fn products_path(&self) -> CollectionPath {
        self.state.config().store.products()
    }

    #[must_use]
    pub fn orders_path(&self) -> CollectionPath {
        self.state.config().store.orders()
    }

    /// Insert a raw document and wait until the mirror shows it.
    pub async fn insert(&self, path: &CollectionPath, fields: Value) -> String {
        let Value::Object(fields) = fields else {
            panic!("seed documents must be JSON objects");
        };
        self.after_sync(async move { self.store().insert(path, fields).await.unwrap() })
            .await
    }

    /// Run `write`, then wait for the mirror to apply the resulting snapshot.
    pub async fn after_sync<T>(&self, write: impl Future<Output = T>) -> T {
        let generation = self.state.sync().generation();
        let out = write.await;
        tokio::time::timeout(SYNC_TIMEOUT, self.state.sync().changed_since(generation))
            .await
            .expect("mirror did not update");
        out
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
