//! Integration tests for catalog pages and commands.

use axum::http::StatusCode;
use serde_json::json;

use popeyon_admin::store::DocumentStore;
use popeyon_integration_tests::TestApp;

async fn app_with_tacos() -> (TestApp, String) {
    let app = TestApp::new().await;
    let id = app
        .insert(
            &app.products_path(),
            json!({"name": "Tacos", "category": "Comida", "price": 12.5, "stock": 3}),
        )
        .await;
    (app, id)
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_empty_catalog() {
    let app = TestApp::new().await;
    let resp = app.get("/products").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("No products yet."));
}

#[tokio::test]
async fn test_list_shows_formatted_price() {
    let (app, _) = app_with_tacos().await;
    let resp = app.get("/products").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Tacos"));
    assert!(resp.body.contains("$12.50"));
}

// =============================================================================
// Create / Edit
// =============================================================================

#[tokio::test]
async fn test_create_product_from_form() {
    let app = TestApp::new().await;

    let resp = app
        .after_sync(app.post_form(
            "/products",
            &[
                ("name", "Horchata"),
                ("category", "Bebidas"),
                ("price", " 12.5 "),
                ("stock", " 3 "),
            ],
        ))
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/products"));

    let snapshot = app.store().snapshot(&app.products_path()).await.unwrap();
    let fields = &snapshot.documents()[0].fields;
    assert_eq!(fields.get("price"), Some(&json!(12.5)));
    assert_eq!(fields.get("stock"), Some(&json!(3)));

    let page = app.get("/products").await;
    assert!(page.body.contains("Horchata"));
}

#[tokio::test]
async fn test_create_writes_zero_for_non_numeric_price() {
    let app = TestApp::new().await;

    let resp = app
        .after_sync(app.post_form(
            "/products",
            &[
                ("name", "Horchata"),
                ("category", "Bebidas"),
                ("price", "abc"),
                ("stock", "1"),
            ],
        ))
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let snapshot = app.store().snapshot(&app.products_path()).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    let fields = &snapshot.documents()[0].fields;
    assert_eq!(fields.get("price"), Some(&json!(0.0)));
    assert_eq!(fields.get("stock"), Some(&json!(1)));
    assert!(app.get("/products").await.body.contains("$0.00"));
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let (app, id) = app_with_tacos().await;
    let resp = app.get(&format!("/products/{id}/edit")).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"value="Tacos""#));
    assert!(resp.body.contains(r#"value="12.5""#));
    assert!(resp.body.contains(&format!(r#"action="/products/{id}""#)));
}

#[tokio::test]
async fn test_edit_unknown_product_is_404() {
    let app = TestApp::new().await;
    let resp = app.get("/products/ghost/edit").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_identifier() {
    let (app, id) = app_with_tacos().await;

    let resp = app
        .after_sync(app.post_form(
            &format!("/products/{id}"),
            &[
                ("name", "Tacos"),
                ("category", "Comida"),
                ("price", "14"),
                ("stock", "7.9"),
            ],
        ))
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let snapshot = app.store().snapshot(&app.products_path()).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    let doc = &snapshot.documents()[0];
    assert_eq!(doc.id, id);
    assert_eq!(doc.fields.get("price"), Some(&json!(14.0)));
    assert_eq!(doc.fields.get("stock"), Some(&json!(7)));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_page_asks_for_confirmation() {
    let (app, id) = app_with_tacos().await;
    let resp = app.get(&format!("/products/{id}/delete")).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"name="confirm" value="yes""#));
}

#[tokio::test]
async fn test_delete_without_confirmation_keeps_product() {
    let (app, id) = app_with_tacos().await;

    let resp = app.post_form(&format!("/products/{id}/delete"), &[]).await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(
        app.store().snapshot(&app.products_path()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_confirmed_delete_removes_product() {
    let (app, id) = app_with_tacos().await;

    let resp = app
        .after_sync(app.post_form(&format!("/products/{id}/delete"), &[("confirm", "yes")]))
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert!(app.state.sync().products().is_empty());
    assert!(app.get("/products").await.body.contains("No products yet."));
}

#[tokio::test]
async fn test_incomplete_product_can_be_edited_and_deleted() {
    let app = TestApp::new().await;
    let id = app
        .insert(&app.products_path(), json!({"name": "Legacy", "price": 5, "stock": 1}))
        .await;

    let list = app.get("/products").await;
    assert!(list.body.contains("Legacy"));

    let edit = app.get(&format!("/products/{id}/edit")).await;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains(r#"value="Legacy""#));

    assert_eq!(
        app.get(&format!("/products/{id}/delete")).await.status,
        StatusCode::OK
    );
    app.after_sync(app.post_form(&format!("/products/{id}/delete"), &[("confirm", "yes")]))
        .await;
    assert!(
        app.store()
            .snapshot(&app.products_path())
            .await
            .unwrap()
            .is_empty()
    );
}

// =============================================================================
// No store
// =============================================================================

#[tokio::test]
async fn test_offline_pages_render_and_writes_fail() {
    let app = TestApp::offline().await;

    let page = app.get("/products").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No products yet."));

    let resp = app
        .post_form(
            "/products",
            &[
                ("name", "Tacos"),
                ("category", "Comida"),
                ("price", "1"),
                ("stock", "1"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}
