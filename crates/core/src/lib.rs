//! Popeyón Core - Shared domain types.
//!
//! This crate provides the types used across the Popeyón components:
//! - `admin` - Catalog and order administration panel
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no store
//! access, no HTTP. Documents arrive here already fetched and leave as field
//! maps ready to be written.
//!
//! # Modules
//!
//! - [`types`] - Document IDs, products, orders, the order lifecycle and
//!   form coercion

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
