//! Business logic services for admin.
//!
//! # Services
//!
//! - `sync` - Live mirror of the products and orders collections
//! - `catalog` - Product create/update/delete commands
//! - `orders` - Order status transitions

pub mod catalog;
pub mod orders;
pub mod sync;

pub use catalog::{CatalogService, DeleteConfirmation, DeleteOutcome};
pub use orders::OrderService;
pub use sync::StoreSync;
