//! Lenient decoding helpers for persisted JSON records.
//!
//! Snapshots written by earlier versions of the storefront carried prices as
//! numbers or strings and quantities in whatever shape the UI produced.
//! These helpers recover a usable value or fall back to a safe default, so a
//! single bad field never poisons a derived total with NaN-like garbage.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Decode a non-negative decimal, falling back to zero.
pub(crate) fn decimal_or_zero(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };
    parsed.unwrap_or_default().max(Decimal::ZERO)
}

/// Decode a quantity, clamping to at least one.
pub(crate) fn quantity_or_one(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.unwrap_or(1).max(1)
}

/// Decode a string field, falling back to the given default.
pub(crate) fn string_or(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => fallback.to_owned(),
    }
}

/// Decode a required, non-empty id field. `None` means the record is dropped.
pub(crate) fn required_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        assert_eq!(
            decimal_or_zero(Some(&json!(55000))),
            Decimal::from_str("55000").unwrap()
        );
        assert_eq!(
            decimal_or_zero(Some(&json!("12.50"))),
            Decimal::from_str("12.50").unwrap()
        );
    }

    #[test]
    fn test_decimal_garbage_falls_back_to_zero() {
        assert_eq!(decimal_or_zero(Some(&json!("not a price"))), Decimal::ZERO);
        assert_eq!(decimal_or_zero(Some(&json!({"nested": true}))), Decimal::ZERO);
        assert_eq!(decimal_or_zero(None), Decimal::ZERO);
    }

    #[test]
    fn test_negative_price_clamps_to_zero() {
        assert_eq!(decimal_or_zero(Some(&json!(-5))), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_clamps_to_one() {
        assert_eq!(quantity_or_one(Some(&json!(3))), 3);
        assert_eq!(quantity_or_one(Some(&json!(0))), 1);
        assert_eq!(quantity_or_one(Some(&json!(-2))), 1);
        assert_eq!(quantity_or_one(Some(&json!("oops"))), 1);
        assert_eq!(quantity_or_one(None), 1);
    }

    #[test]
    fn test_required_id_rejects_blank() {
        assert_eq!(required_id(Some(&json!("p-1"))), Some("p-1".to_owned()));
        assert_eq!(required_id(Some(&json!(""))), None);
        assert_eq!(required_id(Some(&json!("   "))), None);
        assert_eq!(required_id(Some(&json!(42))), None);
        assert_eq!(required_id(None), None);
    }
}
