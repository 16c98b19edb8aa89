//! Payment methods and delivery transport fees.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Delivery-fee tier for cash-on-delivery orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportZone {
    InZone,
    OutOfZone,
}

impl TransportZone {
    /// Flat delivery fee for this zone, in rupees.
    #[must_use]
    pub fn fee(self) -> Decimal {
        match self {
            Self::InZone => Decimal::from(500),
            Self::OutOfZone => Decimal::from(800),
        }
    }

    /// Display label, as shown on invoices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InZone => "In Southern Province",
            Self::OutOfZone => "Out of Southern Province",
        }
    }
}

/// Transport fee for an optional zone choice; no zone means no fee.
#[must_use]
pub fn transport_fee(zone: Option<TransportZone>) -> Decimal {
    zone.map_or(Decimal::ZERO, TransportZone::fee)
}

/// The payment options a shopper can pick from, before any method-specific
/// state (slip upload, zone choice) is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Card,
    BankSlip,
    CashOnDelivery,
}

/// A completed payment choice as recorded on an order.
///
/// `Card` is recognized but disabled: completion always rejects it with a
/// user-facing "currently unavailable" message. This is a business rule of
/// the storefront, not a missing feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankSlip { slip: SlipImage },
    CashOnDelivery { zone: TransportZone },
}

impl PaymentMethod {
    /// The selectable kind this method was built from.
    #[must_use]
    pub const fn kind(&self) -> PaymentKind {
        match self {
            Self::Card => PaymentKind::Card,
            Self::BankSlip { .. } => PaymentKind::BankSlip,
            Self::CashOnDelivery { .. } => PaymentKind::CashOnDelivery,
        }
    }

    /// Display label, as shown on invoices.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Card => "Credit Card",
            Self::BankSlip { .. } => "Bank Transfer",
            Self::CashOnDelivery { .. } => "Cash on Delivery",
        }
    }

    /// The transport zone, for cash-on-delivery orders.
    #[must_use]
    pub const fn transport_zone(&self) -> Option<TransportZone> {
        match self {
            Self::CashOnDelivery { zone } => Some(*zone),
            _ => None,
        }
    }
}

/// An uploaded proof-of-payment image for bank-slip orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipImage {
    pub filename: String,
    /// Media type of the upload, e.g. `image/png`.
    pub media_type: String,
    #[serde(with = "slip_bytes")]
    pub bytes: Vec<u8>,
}

impl SlipImage {
    /// Inline preview of the slip as a `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

/// Slip bytes are persisted as base64 so order snapshots stay valid JSON.
mod slip_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}
