//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! popeyon-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! `crates/admin/migrations/`: the `documents` table and its change trigger.

use secrecy::SecretString;
use thiserror::Error;

use popeyon_admin::store::{PgDocumentStore, StoreError};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run the document store migrations.
///
/// # Errors
///
/// Returns an error if no database URL is set, the database cannot be
/// reached, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to document database...");
    let store = PgDocumentStore::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
