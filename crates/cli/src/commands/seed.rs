//! Load products and orders from a YAML file into the configured tenant.
//!
//! Orders never originate in the admin; seeding (or the shop itself) is the
//! only way they enter the store.
//!
//! # File format
//!
//! ```yaml
//! products:
//!   - name: Tacos al pastor
//!     category: Comida
//!     price: 12.5
//!     stock: 40
//! orders:
//!   - customer:
//!       name: Ana
//!       phone: "555-0101"
//!       address: Calle 1
//!       city: Monterrey
//!       postalCode: "64000"
//!     items:
//!       - { name: Tacos al pastor, quantity: 2 }
//!     total: 25
//!     status: pending
//!     createdAt: 2025-03-01T12:30:00Z
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use popeyon_admin::config::{AdminConfig, ConfigError, StoreConfig};
use popeyon_admin::state::open_store;
use popeyon_admin::store::{CollectionPath, DocumentStore, StoreError};
use popeyon_core::{DocumentError, OrderFields, ProductFields, to_fields};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub products: Vec<ProductFields>,
    #[serde(default)]
    pub orders: Vec<OrderFields>,
}

/// What a seeding run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products_inserted: usize,
    pub orders_inserted: usize,
    pub documents_cleared: usize,
}

/// Seed the configured store from a YAML file.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the file is missing or
/// malformed, or a store write fails.
pub async fn run(file_path: &str, clear_existing: bool) -> Result<SeedSummary, SeedError> {
    dotenvy::dotenv().ok();
    let config = AdminConfig::from_env()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_string()));
    }

    info!(path = %file_path, "Loading seed data from file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(
        products = seed.products.len(),
        orders = seed.orders.len(),
        "Parsed seed file"
    );

    let store = open_store(&config.store).await?;
    let summary = seed_store(store.as_ref(), &config.store, &seed, clear_existing).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.products_inserted);
    info!("  Orders inserted: {}", summary.orders_inserted);
    if clear_existing {
        info!("  Documents cleared: {}", summary.documents_cleared);
    }
    Ok(summary)
}

/// Write the contents of `seed` into both collections of `config`.
///
/// # Errors
///
/// Returns an error if a document cannot be encoded or a store write fails.
pub async fn seed_store(
    store: &dyn DocumentStore,
    config: &StoreConfig,
    seed: &SeedFile,
    clear_existing: bool,
) -> Result<SeedSummary, SeedError> {
    let products = config.products();
    let orders = config.orders();
    let mut summary = SeedSummary::default();

    if clear_existing {
        summary.documents_cleared += clear(store, &products).await?;
        summary.documents_cleared += clear(store, &orders).await?;
    }

    for product in &seed.products {
        store.insert(&products, to_fields(product)?).await?;
        summary.products_inserted += 1;
    }
    for order in &seed.orders {
        store.insert(&orders, to_fields(order)?).await?;
        summary.orders_inserted += 1;
    }

    Ok(summary)
}

async fn clear(store: &dyn DocumentStore, path: &CollectionPath) -> Result<usize, SeedError> {
    let snapshot = store.snapshot(path).await?;
    for doc in snapshot.documents() {
        store.delete(path, &doc.id).await?;
    }
    info!(path = %path, removed = snapshot.len(), "Cleared collection");
    Ok(snapshot.len())
}
