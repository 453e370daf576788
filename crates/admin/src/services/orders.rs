//! Order status commands.
//!
//! Orders are created by the shop, never here. The only write the admin
//! performs is moving `status` one step along the lifecycle, and only after
//! the move has been checked against the transition table.

use serde_json::Value;
use tracing::instrument;

use popeyon_core::{Fields, Order, OrderStatus};

use crate::error::AppError;
use crate::store::{CollectionPath, DynDocumentStore};

/// Writes to the `orders` collection.
pub struct OrderService {
    store: DynDocumentStore,
    path: CollectionPath,
}

impl OrderService {
    #[must_use]
    pub const fn new(store: DynDocumentStore, path: CollectionPath) -> Self {
        Self { store, path }
    }

    /// Move `order` to `to`, writing only the `status` field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transition` (without writing) if the move is not
    /// allowed from the order's current status, or `AppError::Store` if the
    /// write fails.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status))]
    pub async fn advance(&self, order: &Order, to: OrderStatus) -> Result<OrderStatus, AppError> {
        let next = order.status.transition_to(to)?;

        let mut fields = Fields::new();
        fields.insert("status".to_string(), Value::from(next.as_str()));
        self.store
            .update(&self.path, order.id.as_str(), fields)
            .await?;

        tracing::info!(to = %next, "Order status advanced");
        Ok(next)
    }
}
