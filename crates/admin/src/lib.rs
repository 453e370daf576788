//! Popeyón Admin library.
//!
//! Catalog editing and order handling for a single shop tenant. Products and
//! orders live in a document store; the admin keeps a live mirror of both
//! collections and renders it with server-side templates.
//!
//! # Security
//!
//! There is no login. Bind to loopback (the default) or put the panel behind
//! a private network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use app::app;
