//! Order route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use popeyon_core::{Order, OrderId, OrderStatus, format_money, map_search_url};

use crate::{error::AppError, state::AppState};

use super::NavView;

const ANONYMOUS_CUSTOMER: &str = "Anonymous customer";
const NOT_AVAILABLE: &str = "N/A";

/// Button offered for an order.
#[derive(Debug, Clone)]
pub struct ActionView {
    pub target: &'static str,
    pub label: &'static str,
}

/// Order view for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub customer_name: String,
    pub phone: String,
    pub created_at: String,
    pub address: String,
    pub map_url: String,
    pub items: Vec<String>,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
    pub actions: Vec<ActionView>,
}

// =============================================================================
// Type Conversions
// =============================================================================

const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "bg-yellow-100 text-yellow-800 border-yellow-300",
        OrderStatus::Shipped => "bg-blue-100 text-blue-800 border-blue-300",
        OrderStatus::Completed => "bg-green-100 text-green-800 border-green-300",
    }
}

/// Empty text counts as missing.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let customer = order.customer.as_ref();
        let address = order.address();

        Self {
            id: order.id.to_string(),
            customer_name: customer
                .and_then(|c| non_empty(c.name.as_deref()))
                .unwrap_or_else(|| ANONYMOUS_CUSTOMER.to_string()),
            phone: customer
                .and_then(|c| non_empty(c.phone.as_deref()))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            created_at: order.created_at.map_or_else(
                || NOT_AVAILABLE.to_string(),
                |ts| ts.format("%Y-%m-%d %H:%M UTC").to_string(),
            ),
            map_url: map_search_url(&address),
            address,
            items: order
                .items
                .iter()
                .map(|item| format!("{}x {}", item.quantity, item.name))
                .collect(),
            total: format_money(order.total),
            status: order.status.to_string(),
            status_class: status_class(order.status),
            actions: order
                .actions()
                .iter()
                .map(|action| ActionView {
                    target: action.target().as_str(),
                    label: action.label(),
                })
                .collect(),
        }
    }
}

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub nav: NavView,
    pub orders: Vec<OrderView>,
}

/// Pending badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/pending_badge.html")]
pub struct PendingBadgeTemplate {
    pub count: usize,
}

/// Status change form input.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    /// Requested status.
    pub status: String,
}

/// Orders list page handler.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> OrdersIndexTemplate {
    let orders = state
        .sync()
        .orders()
        .iter()
        .map(OrderView::from)
        .collect();

    OrdersIndexTemplate {
        nav: NavView::new(&state, "/orders"),
        orders,
    }
}

/// Advance an order along its lifecycle.
///
/// The current status comes from the mirror; the move is checked before
/// anything is written.
#[instrument(skip(state, input), fields(to = %input.status))]
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<StatusInput>,
) -> Result<Redirect, AppError> {
    let to: OrderStatus = input
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown status {:?}", input.status)))?;

    let order = state
        .sync()
        .order(&OrderId::new(id))
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    state.orders()?.advance(&order, to).await?;
    Ok(Redirect::to("/orders"))
}

/// Pending badge fragment, polled by the navigation.
#[instrument(skip(state))]
pub async fn pending_count(State(state): State<AppState>) -> PendingBadgeTemplate {
    PendingBadgeTemplate {
        count: state.sync().pending_count(),
    }
}
