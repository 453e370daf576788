//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use popeyon_core::{Product, ProductForm, ProductId, format_money};

use crate::{
    error::AppError,
    services::{DeleteConfirmation, DeleteOutcome},
    state::AppState,
};

use super::NavView;

/// Product view for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: i64,
    pub stock_class: &'static str,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let stock_class = if product.stock > 0 {
            "bg-green-100 text-green-700"
        } else {
            "bg-red-100 text-red-700"
        };

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: format_money(product.price),
            stock: product.stock,
            stock_class,
        }
    }
}

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: NavView,
    pub products: Vec<ProductView>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub nav: NavView,
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: ProductForm,
}

/// Delete confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/delete.html")]
pub struct DeleteProductTemplate {
    pub nav: NavView,
    pub product: ProductView,
}

/// Delete form input.
#[derive(Debug, Deserialize)]
pub struct DeleteInput {
    /// Must be `yes` for the delete to go through.
    pub confirm: Option<String>,
}

fn find_product(state: &AppState, id: &ProductId) -> Result<Product, AppError> {
    state
        .sync()
        .product(id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Products list page handler.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ProductsIndexTemplate {
    let products = state
        .sync()
        .products()
        .iter()
        .map(ProductView::from)
        .collect();

    ProductsIndexTemplate {
        nav: NavView::new(&state, "/products"),
        products,
    }
}

/// Empty product form.
#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> ProductFormTemplate {
    ProductFormTemplate {
        nav: NavView::new(&state, "/products"),
        heading: "New product",
        action: "/products".to_string(),
        submit_label: "Create",
        form: ProductForm::default(),
    }
}

/// Create a product and return to the list.
#[instrument(skip(state, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let fields = form.into_fields();
    state.catalog()?.create(fields).await?;
    Ok(Redirect::to("/products"))
}

/// Product form pre-filled from the mirror.
#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProductFormTemplate, AppError> {
    let product = find_product(&state, &ProductId::new(id))?;

    Ok(ProductFormTemplate {
        nav: NavView::new(&state, "/products"),
        heading: "Edit product",
        action: format!("/products/{}", product.id),
        submit_label: "Save",
        form: ProductForm::from(&product),
    })
}

/// Overwrite the editable fields of a product.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let fields = form.into_fields();
    state.catalog()?.update(&ProductId::new(id), fields).await?;
    Ok(Redirect::to("/products"))
}

/// Ask the admin to confirm a delete.
#[instrument(skip(state))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<DeleteProductTemplate, AppError> {
    let product = find_product(&state, &ProductId::new(id))?;

    Ok(DeleteProductTemplate {
        nav: NavView::new(&state, "/products"),
        product: ProductView::from(&product),
    })
}

/// Delete a product once confirmed.
#[instrument(skip(state, input))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<DeleteInput>,
) -> Result<Redirect, AppError> {
    let confirmation = DeleteConfirmation::from_form(input.confirm.as_deref());
    let outcome = state
        .catalog()?
        .delete(&ProductId::new(id), confirmation)
        .await?;

    if outcome == DeleteOutcome::Cancelled {
        tracing::debug!("Delete cancelled by admin");
    }
    Ok(Redirect::to("/products"))
}
