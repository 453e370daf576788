//! Serde readers for fields other clients write with loose types.
//!
//! The shop stores postal codes and phones as numbers, totals as strings and
//! sometimes `null` where a value is expected. Reading one of these fields
//! never fails; a value that cannot be used becomes the field's empty value.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::price::{coerce_count, coerce_number};

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text from a string, number or boolean; anything else is `None`.
///
/// # Errors
///
/// Only fails when the input itself is not valid for the deserializer.
pub fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(text_of))
}

/// Like [`optional_text`], with missing values as the empty string.
///
/// # Errors
///
/// Only fails when the input itself is not valid for the deserializer.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

/// A decimal from a number or numeric text; anything else is 0.
///
/// # Errors
///
/// Only fails when the input itself is not valid for the deserializer.
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => coerce_number(&n.to_string()),
        Value::String(s) => coerce_number(&s),
        _ => Decimal::ZERO,
    })
}

/// A whole number from a number or numeric text, fractions truncated;
/// anything else is 0.
///
/// # Errors
///
/// Only fails when the input itself is not valid for the deserializer.
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => coerce_count(&n.to_string()),
        Value::String(s) => coerce_count(&s),
        _ => 0,
    })
}
