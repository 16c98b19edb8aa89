//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;

/// Fallback display name for records persisted without one.
pub(crate) const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// One product entry in the cart, with quantity.
///
/// The cart holds exactly one line item per product id; adding the same
/// product again merges into the existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
    pub category: String,
}

impl CartLineItem {
    /// Create a line item with empty image/category metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity: quantity.max(1),
            image: String::new(),
            category: String::new(),
        }
    }

    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Rebuild a line item from a persisted JSON record.
    ///
    /// Returns `None` when the record has no usable id; every other field is
    /// normalized to a safe default (`"Unknown Product"`, price `0`,
    /// quantity clamped to at least `1`, empty image/category).
    #[must_use]
    pub fn from_persisted(value: &Value) -> Option<Self> {
        let id = de::required_id(value.get("id"))?;
        Some(Self {
            id,
            name: de::string_or(value.get("name"), UNKNOWN_PRODUCT),
            price: de::decimal_or_zero(value.get("price")),
            quantity: de::quantity_or_one(value.get("quantity")),
            image: de::string_or(value.get("image"), ""),
            category: de::string_or(value.get("category"), ""),
        })
    }
}
