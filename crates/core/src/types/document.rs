//! Raw documents as delivered by the document store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field map of a single document.
pub type Fields = Map<String, Value>;

/// A document could not be turned into a domain type.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode fields: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// One document: the store-assigned identifier plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode the fields into `T`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Decode` if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DocumentError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|source| {
            DocumentError::Decode {
                id: self.id.clone(),
                source,
            }
        })
    }
}

/// Serialize `value` into a field map.
///
/// # Errors
///
/// Returns an error if `value` does not serialize to a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, DocumentError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Err(DocumentError::NotAnObject("null")),
        Value::Bool(_) => Err(DocumentError::NotAnObject("bool")),
        Value::Number(_) => Err(DocumentError::NotAnObject("number")),
        Value::String(_) => Err(DocumentError::NotAnObject("string")),
        Value::Array(_) => Err(DocumentError::NotAnObject("array")),
    }
}
