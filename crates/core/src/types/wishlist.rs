//! Wishlist entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cart::{CartLineItem, UNKNOWN_PRODUCT};
use super::de;

/// A saved product reference.
///
/// The wishlist is a set keyed by product id: no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    /// Rebuild an entry from a persisted JSON record.
    ///
    /// Returns `None` when the record has no usable id. `now` is the
    /// fallback timestamp for records persisted without one.
    #[must_use]
    pub fn from_persisted(value: &Value, now: DateTime<Utc>) -> Option<Self> {
        let id = de::required_id(value.get("id"))?;
        let added_at = value
            .get("addedAt")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or(now);
        Some(Self {
            id,
            name: de::string_or(value.get("name"), UNKNOWN_PRODUCT),
            price: de::decimal_or_zero(value.get("price")),
            image: de::string_or(value.get("image"), ""),
            category: de::string_or(value.get("category"), ""),
            added_at,
        })
    }

    /// View this entry as a cart line item with quantity one, for the
    /// wishlist page's "add to cart" action.
    #[must_use]
    pub fn to_cart_item(&self) -> CartLineItem {
        CartLineItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity: 1,
            image: self.image.clone(),
            category: self.category.clone(),
        }
    }
}

/// Older snapshots stored bare dates (`2023-07-12`) instead of RFC 3339.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
