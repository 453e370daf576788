//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::{Document, DocumentError};
use super::id::ProductId;
use super::lenient;
use super::price::{coerce_count, coerce_number};

/// The four editable product fields, exactly as written to the store.
///
/// Reading is forgiving: a missing or oddly typed field comes back empty or
/// zero so the product can still be listed, edited and deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::amount"
    )]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: i64,
}

/// A product mirrored from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
}

impl Product {
    #[must_use]
    pub fn new(id: ProductId, fields: ProductFields) -> Self {
        Self {
            id,
            name: fields.name,
            category: fields.category,
            price: fields.price,
            stock: fields.stock,
        }
    }

    /// Decode a product from a store document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the fields cannot be read at all.
    pub fn from_document(doc: &Document) -> Result<Self, DocumentError> {
        let fields: ProductFields = doc.decode()?;
        Ok(Self::new(ProductId::new(doc.id.clone()), fields))
    }

    /// The editable fields of this product.
    #[must_use]
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            stock: self.stock,
        }
    }
}

/// Raw product form input. Every field arrives as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
}

impl ProductForm {
    /// Coerce the text input into storable fields.
    ///
    /// Price and stock are trimmed and converted to numbers. Nothing is
    /// rejected: negative values pass through and text that is not a number
    /// is written as 0.
    #[must_use]
    pub fn into_fields(self) -> ProductFields {
        ProductFields {
            price: coerce_number(&self.price),
            stock: coerce_count(&self.stock),
            name: self.name,
            category: self.category,
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.normalize().to_string(),
            stock: product.stock.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::document::to_fields;
    use serde_json::json;

    fn form(price: &str, stock: &str) -> ProductForm {
        ProductForm {
            name: "Ceviche".to_string(),
            category: "Mariscos".to_string(),
            price: price.to_string(),
            stock: stock.to_string(),
        }
    }

    #[test]
    fn test_form_coerces_numbers_to_json_numbers() {
        let fields = form(" 12.5 ", " 3 ").into_fields();
        let written = to_fields(&fields).unwrap();

        assert_eq!(written.get("price"), Some(&json!(12.5)));
        assert_eq!(written.get("stock"), Some(&json!(3)));
        assert_eq!(written.get("name"), Some(&json!("Ceviche")));
        assert_eq!(written.len(), 4);
    }

    #[test]
    fn test_form_writes_zero_for_non_numeric_input() {
        let fields = form("twelve", "lots").into_fields();
        let written = to_fields(&fields).unwrap();

        assert_eq!(written.get("price"), Some(&json!(0.0)));
        assert_eq!(written.get("stock"), Some(&json!(0)));
    }

    #[test]
    fn test_form_accepts_negative_values() {
        let fields = form("-1", "-5").into_fields();
        assert_eq!(fields.price, Decimal::from(-1));
        assert_eq!(fields.stock, -5);
    }

    #[test]
    fn test_from_document_reads_float_stock() {
        let doc = Document::new(
            "p1",
            json!({"name": "Tacos", "category": "Comida", "price": 4, "stock": 10.0})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let product = Product::from_document(&doc).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Decimal::from(4));
        assert_eq!(product.stock, 10);
    }

    #[test]
    fn test_prefill_form_from_product() {
        let product = Product::new(
            ProductId::new("p1"),
            ProductFields {
                name: "Tacos".to_string(),
                category: "Comida".to_string(),
                price: Decimal::new(1250, 2),
                stock: 2,
            },
        );
        let prefill = ProductForm::from(&product);
        assert_eq!(prefill.price, "12.5");
        assert_eq!(prefill.stock, "2");
        assert_eq!(prefill.into_fields(), product.fields());
    }

    #[test]
    fn test_from_document_defaults_missing_fields() {
        let doc = Document::new(
            "p2",
            json!({"name": "Legacy", "price": "5", "stock": null})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let product = Product::from_document(&doc).unwrap();
        assert_eq!(product.name, "Legacy");
        assert_eq!(product.category, "");
        assert_eq!(product.price, Decimal::from(5));
        assert_eq!(product.stock, 0);
    }
}
