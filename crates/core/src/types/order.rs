//! Customer orders.
//!
//! Orders are written by the customer-facing shop; the admin only reads them
//! and advances their status. Line items are a denormalized copy of what was
//! bought (name and quantity at order time) and carry no reference back to
//! the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::{Document, DocumentError};
use super::id::OrderId;
use super::lenient;
use super::status::{OrderAction, OrderStatus};

/// Shown instead of an address when the order has no customer block.
pub const ADDRESS_PLACEHOLDER: &str = "Address not provided";

const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Customer contact details. Every field may be missing independently.
///
/// Phones and postal codes are often stored as numbers; they read as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        alias = "zipCode",
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub postal_code: Option<String>,
}

/// One ordered product, copied at order time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: i64,
}

/// Order fields as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFields {
    #[serde(
        default,
        deserialize_with = "customer_block",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::amount"
    )]
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// An order mirrored from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer: Option<Customer>,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub fn new(id: OrderId, fields: OrderFields) -> Self {
        Self {
            id,
            customer: fields.customer,
            items: fields.items,
            total: fields.total,
            status: fields.status,
            created_at: fields.created_at,
        }
    }

    /// Decode an order from a store document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the status is missing or unknown, or a
    /// field has the wrong type.
    pub fn from_document(doc: &Document) -> Result<Self, DocumentError> {
        let fields: OrderFields = doc.decode()?;
        Ok(Self::new(OrderId::new(doc.id.clone()), fields))
    }

    /// Timestamp used for ordering; unset counts as the Unix epoch.
    #[must_use]
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// One-line delivery address.
    #[must_use]
    pub fn address(&self) -> String {
        format_address(self.customer.as_ref())
    }

    /// Actions offered for this order's current status.
    #[must_use]
    pub const fn actions(&self) -> &'static [OrderAction] {
        self.status.actions()
    }
}

/// Join address, city and postal code with `", "`.
///
/// Missing parts become empty strings; a missing customer yields
/// [`ADDRESS_PLACEHOLDER`].
#[must_use]
pub fn format_address(customer: Option<&Customer>) -> String {
    let Some(customer) = customer else {
        return ADDRESS_PLACEHOLDER.to_string();
    };
    format!(
        "{}, {}, {}",
        customer.address.as_deref().unwrap_or_default(),
        customer.city.as_deref().unwrap_or_default(),
        customer.postal_code.as_deref().unwrap_or_default(),
    )
}

/// Map search link for a formatted address.
#[must_use]
pub fn map_search_url(address: &str) -> String {
    format!("{MAP_SEARCH_BASE}{}", urlencoding::encode(address))
}

/// Sort newest first. Orders without a timestamp go last; ties keep their
/// incoming order.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|order| std::cmp::Reverse(order.sort_key()));
}

/// Number of orders still waiting to ship.
#[must_use]
pub fn count_pending(orders: &[Order]) -> usize {
    orders
        .iter()
        .filter(|order| order.status == OrderStatus::Pending)
        .count()
}

/// A customer block that is not an object reads as no customer.
fn customer_block<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Customer>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| Customer::deserialize(value).ok()))
}

/// Reading `createdAt` from the shapes other clients write.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(DateTime<Utc>),
        Parts {
            #[serde(alias = "_seconds")]
            seconds: i64,
            #[serde(default, alias = "_nanoseconds")]
            nanoseconds: u32,
        },
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Text(at)) => Ok(Some(at)),
            Some(Raw::Parts {
                seconds,
                nanoseconds,
            }) => DateTime::from_timestamp(seconds, nanoseconds)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp {seconds} out of range"))),
        }
    }
}
