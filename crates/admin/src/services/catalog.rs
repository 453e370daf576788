//! Catalog commands: create, update and delete products.
//!
//! Commands only write to the store. The product list refreshes when the
//! next snapshot arrives through [`super::sync::StoreSync`].

use tracing::instrument;

use popeyon_core::{ProductFields, ProductId, to_fields};

use crate::error::AppError;
use crate::store::{CollectionPath, DynDocumentStore};

/// Whether the admin confirmed a delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    Declined,
}

impl DeleteConfirmation {
    /// Read the `confirm` field of the delete form.
    #[must_use]
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("yes" | "true" | "on") => Self::Confirmed,
            _ => Self::Declined,
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Writes to the `products` collection.
pub struct CatalogService {
    store: DynDocumentStore,
    path: CollectionPath,
}

impl CatalogService {
    #[must_use]
    pub const fn new(store: DynDocumentStore, path: CollectionPath) -> Self {
        Self { store, path }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the insert fails.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub async fn create(&self, fields: ProductFields) -> Result<ProductId, AppError> {
        let id = self.store.insert(&self.path, to_fields(&fields)?).await?;
        tracing::info!(product_id = %id, "Product created");
        Ok(ProductId::new(id))
    }

    /// Overwrite the four editable fields of a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the product does not exist or the update fails.
    #[instrument(skip(self, fields), fields(product_id = %id))]
    pub async fn update(&self, id: &ProductId, fields: ProductFields) -> Result<(), AppError> {
        self.store
            .update(&self.path, id.as_str(), to_fields(&fields)?)
            .await?;
        tracing::info!("Product updated");
        Ok(())
    }

    /// Delete a product, but only once the admin has confirmed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the delete fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(
        &self,
        id: &ProductId,
        confirmation: DeleteConfirmation,
    ) -> Result<DeleteOutcome, AppError> {
        if confirmation == DeleteConfirmation::Declined {
            tracing::debug!("Delete not confirmed");
            return Ok(DeleteOutcome::Cancelled);
        }
        self.store.delete(&self.path, id.as_str()).await?;
        tracing::info!("Product deleted");
        Ok(DeleteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::recording::{Call, RecordingStore};
    use crate::store::{Collection, DocumentStore};
    use popeyon_core::ProductForm;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Arc;

    fn path() -> CollectionPath {
        CollectionPath::new("t", "o", Collection::Products)
    }

    fn setup() -> (Arc<RecordingStore>, CatalogService) {
        let store = Arc::new(RecordingStore::new());
        let service = CatalogService::new(store.clone(), path());
        (store, service)
    }

    fn tacos() -> ProductFields {
        ProductFields {
            name: "Tacos".to_string(),
            category: "Comida".to_string(),
            price: Decimal::new(125, 1),
            stock: 3,
        }
    }

    #[tokio::test]
    async fn test_create_writes_numeric_fields() {
        let (store, service) = setup();
        let form = ProductForm {
            name: "Tacos".to_string(),
            category: "Comida".to_string(),
            price: " 12.5".to_string(),
            stock: "3 ".to_string(),
        };
        service.create(form.into_fields()).await.unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        let Call::Insert(fields) = &calls[0] else {
            panic!("expected insert, got {calls:?}");
        };
        assert_eq!(fields.get("price"), Some(&json!(12.5)));
        assert_eq!(fields.get("stock"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_update_keeps_identifier_and_other_fields() {
        let (store, service) = setup();
        let id = service.create(tacos()).await.unwrap();
        store
            .update(
                &path(),
                id.as_str(),
                json!({"featured": true}).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();

        let mut edited = tacos();
        edited.stock = 9;
        service.update(&id, edited).await.unwrap();

        let snapshot = store.snapshot(&path()).await.unwrap();
        let doc = &snapshot.documents()[0];
        assert_eq!(doc.id, id.as_str());
        assert_eq!(doc.fields.get("stock"), Some(&json!(9)));
        assert_eq!(doc.fields.get("featured"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let (_store, service) = setup();
        let err = service
            .update(&ProductId::new("ghost"), tacos())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn test_delete_without_confirmation_issues_no_call() {
        let (store, service) = setup();
        let id = service.create(tacos()).await.unwrap();

        let outcome = service
            .delete(&id, DeleteConfirmation::Declined)
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(store.deletes().is_empty());
        assert_eq!(store.snapshot(&path()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_delete_issues_exactly_one_call() {
        let (store, service) = setup();
        let id = service.create(tacos()).await.unwrap();

        let outcome = service
            .delete(&id, DeleteConfirmation::Confirmed)
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(store.deletes(), [id.into_inner()]);
        assert!(store.snapshot(&path()).await.unwrap().is_empty());
    }

    #[test]
    fn test_confirmation_from_form() {
        assert_eq!(
            DeleteConfirmation::from_form(Some("yes")),
            DeleteConfirmation::Confirmed
        );
        assert_eq!(
            DeleteConfirmation::from_form(Some("no")),
            DeleteConfirmation::Declined
        );
        assert_eq!(
            DeleteConfirmation::from_form(None),
            DeleteConfirmation::Declined
        );
    }
}
