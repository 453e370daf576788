//! Core types for the Popeyón admin panel.
//!
//! This module provides type-safe wrappers for the catalog and order domain.

pub mod document;
pub mod id;
pub mod lenient;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use document::{Document, DocumentError, Fields, to_fields};
pub use id::*;
pub use order::{
    ADDRESS_PLACEHOLDER, Customer, LineItem, Order, OrderFields, count_pending, format_address,
    map_search_url, sort_newest_first,
};
pub use price::{coerce_count, coerce_number, format_money, parse_number};
pub use product::{Product, ProductFields, ProductForm};
pub use status::*;
