//! Money amounts.
//!
//! Prices and totals are `Decimal` in memory and plain JSON numbers in the
//! store, so both serialize through `rust_decimal::serde::float`.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Format an amount for display, e.g. `$12.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Parse free-form input as a decimal number.
///
/// Surrounding whitespace is ignored and blank input is zero. Scientific
/// notation (`1e3`) is accepted. Returns `None` for anything else.
#[must_use]
pub fn parse_number(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    Decimal::from_str(unsigned)
        .or_else(|_| Decimal::from_scientific(unsigned))
        .ok()
}

/// Coerce input to a number, never failing.
///
/// Text that is not a number becomes 0 and is still written; the form does no
/// validation of its own.
#[must_use]
pub fn coerce_number(input: &str) -> Decimal {
    parse_number(input).unwrap_or(Decimal::ZERO)
}

/// Coerce input to a whole number, truncating toward zero.
///
/// Text that is not a number, or a value outside `i64`, becomes 0.
#[must_use]
pub fn coerce_count(input: &str) -> i64 {
    parse_number(input)
        .and_then(|n| n.trunc().to_i64())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(125, 1)), "$12.50");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_parse_number_trims_whitespace() {
        assert_eq!(parse_number(" 12.5 "), Some(Decimal::new(125, 1)));
        assert_eq!(parse_number("\t7\n"), Some(Decimal::from(7)));
        assert_eq!(parse_number("1e3"), Some(Decimal::from(1000)));
    }

    #[test]
    fn test_parse_number_blank_is_zero() {
        assert_eq!(parse_number("   "), Some(Decimal::ZERO));
    }

    #[test]
    fn test_parse_number_keeps_negative_values() {
        assert_eq!(parse_number("-4"), Some(Decimal::from(-4)));
    }

    #[test]
    fn test_non_numeric_text_coerces_to_zero() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(coerce_number("abc"), Decimal::ZERO);
        assert_eq!(coerce_count("many"), 0);
    }

    #[test]
    fn test_coerce_count_truncates() {
        assert_eq!(coerce_count("3.9"), 3);
        assert_eq!(coerce_count("-2.5"), -2);
        assert_eq!(coerce_count(" 3 "), 3);
        assert_eq!(coerce_count("1e30"), 0);
    }
}
