//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to /orders
//!
//! # Products
//! GET  /products                  - Product listing
//! GET  /products/new              - Empty product form
//! POST /products                  - Create product
//! GET  /products/{id}/edit        - Pre-filled product form
//! POST /products/{id}             - Update product
//! GET  /products/{id}/delete      - Delete confirmation page
//! POST /products/{id}/delete      - Delete product (requires confirm=yes)
//!
//! # Orders
//! GET  /orders                    - Order listing, newest first
//! POST /orders/{id}/status        - Advance order status
//! GET  /orders/pending-count      - Pending badge fragment
//! ```
//!
//! Health endpoints are mounted by the binary.

pub mod orders;
pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Navigation data shared by every full page.
#[derive(Debug, Clone)]
pub struct NavView {
    pub current_path: &'static str,
    pub product_count: usize,
    pub pending_count: usize,
    pub loaded: bool,
}

impl NavView {
    #[must_use]
    pub fn new(state: &AppState, current_path: &'static str) -> Self {
        let sync = state.sync();
        Self {
            current_path,
            product_count: sync.product_count(),
            pending_count: sync.pending_count(),
            loaded: sync.is_loaded(),
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit))
        .route(
            "/{id}/delete",
            get(products::confirm_delete).post(products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/pending-count", get(orders::pending_count))
        .route("/{id}/status", post(orders::advance))
}

/// Create all page routes for the admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
}
