//! `PostgreSQL`-backed document store.
//!
//! # Table
//!
//! - `documents` - one row per document, keyed by `(collection_path, id)`,
//!   fields kept as JSONB
//!
//! A row trigger calls `pg_notify('document_changes', collection_path)` on
//! every insert, update and delete. Subscribers `LISTEN` on that channel and
//! re-read the whole collection when their path is named.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p popeyon-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::{PgListener, PgPoolOptions};
use sqlx::types::Json;
use uuid::Uuid;

use popeyon_core::{Document, Fields};

use super::{
    CollectionPath, DocumentStore, Snapshot, SnapshotHandler, StoreError, Subscription,
};

/// Notification channel the `documents` trigger publishes on.
pub const CHANGE_CHANNEL: &str = "document_changes";

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Document store over a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self::new(pool))
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the migrations in `crates/admin/migrations/`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

async fn fetch_snapshot(pool: &PgPool, path: &CollectionPath) -> Result<Snapshot, StoreError> {
    let rows: Vec<(String, Json<Fields>)> = sqlx::query_as(
        r"
        SELECT id, fields FROM documents
        WHERE collection_path = $1
        ORDER BY created_at, id
        ",
    )
    .bind(path.as_str())
    .fetch_all(pool)
    .await?;

    Ok(Snapshot::new(
        rows.into_iter()
            .map(|(id, Json(fields))| Document::new(id, fields))
            .collect(),
    ))
}

/// Deliver a fresh snapshot, logging instead of failing the feed.
async fn refresh(pool: &PgPool, path: &CollectionPath, handler: &SnapshotHandler) {
    match fetch_snapshot(pool, path).await {
        Ok(snapshot) => handler(snapshot),
        Err(e) => tracing::error!(path = %path, error = %e, "Failed to read snapshot"),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, path: &CollectionPath, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        sqlx::query(
            r"
            INSERT INTO documents (collection_path, id, fields)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(path.as_str())
        .bind(&id)
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET fields = fields || $3, updated_at = NOW()
            WHERE collection_path = $1 AND id = $2
            ",
        )
        .bind(path.as_str())
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection_path = $1 AND id = $2
            ",
        )
        .bind(path.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn snapshot(&self, path: &CollectionPath) -> Result<Snapshot, StoreError> {
        fetch_snapshot(&self.pool, path).await
    }

    async fn subscribe(
        &self,
        path: &CollectionPath,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;

        let pool = self.pool.clone();
        let feed_path = path.clone();

        let task = tokio::spawn(async move {
            refresh(&pool, &feed_path, &handler).await;

            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => {
                        if notification.payload() == feed_path.as_str() {
                            refresh(&pool, &feed_path, &handler).await;
                        }
                    }
                    // Connection dropped; the next call reconnects. Changes made
                    // meanwhile were not notified, so re-read once it is back.
                    Ok(None) => {
                        tracing::warn!(path = %feed_path, "Change feed connection lost, reconnecting");
                        refresh(&pool, &feed_path, &handler).await;
                    }
                    Err(e) => {
                        tracing::error!(path = %feed_path, error = %e, "Change feed error");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Ok(Subscription::new(path.clone(), task))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
