//! The order model and its status state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cart::CartLineItem;
use super::payment::PaymentMethod;
use super::shipping::ShippingInfo;

/// Order identifier in the storefront's `GZ-<6 digits>-<3 digits>` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

/// Returned when a string does not match the order id format.
#[derive(Debug, Error)]
#[error("invalid order id: {0:?}")]
pub struct OrderIdError(String);

impl OrderId {
    /// Validate and wrap an order id string.
    ///
    /// # Errors
    ///
    /// Returns [`OrderIdError`] when the string is not `GZ-` followed by six
    /// digits, a dash, and three digits.
    pub fn parse(s: &str) -> Result<Self, OrderIdError> {
        let mut parts = s.split('-');
        let well_formed = parts.next() == Some("GZ")
            && parts.next().is_some_and(|p| p.len() == 6 && all_digits(p))
            && parts.next().is_some_and(|p| p.len() == 3 && all_digits(p))
            && parts.next().is_none();
        if well_formed {
            Ok(Self(s.to_owned()))
        } else {
            Err(OrderIdError(s.to_owned()))
        }
    }

    /// Build an id from its numeric parts, both truncated into range.
    #[must_use]
    pub fn from_parts(stamp: u64, suffix: u32) -> Self {
        Self(format!("GZ-{:06}-{:03}", stamp % 1_000_000, suffix % 1000))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Order lifecycle states.
///
/// Bank-slip orders move `Pending -> AwaitingApproval -> Approved`; card and
/// cash orders complete immediately (`Pending -> Completed`). `Cancelled` and
/// `Failed` are terminal states reachable only through external
/// administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    AwaitingApproval,
    Approved,
    Completed,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Terminal states admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Whether moving to `next` is a legal forward transition.
    ///
    /// No state ever transitions back to `Pending`.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::AwaitingApproval | Self::Completed | Self::Cancelled | Self::Failed
            ) | (Self::AwaitingApproval, Self::Approved | Self::Cancelled | Self::Failed)
        )
    }

    /// Display label for order-history surfaces.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::AwaitingApproval => "Awaiting Approval",
            Self::Approved => "Approved",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }
}

/// The input to [`Order`] creation: a cart snapshot plus checkout choices.
///
/// Deliberately carries no totals. Totals are always recomputed from the
/// items at recording time; a caller-supplied total is never trusted.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub items: Vec<CartLineItem>,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
}

impl OrderDraft {
    /// Initial status for the order this draft produces: bank-slip payments
    /// wait for approval, everything else completes immediately.
    #[must_use]
    pub const fn initial_status(&self) -> OrderStatus {
        match self.payment_method {
            PaymentMethod::BankSlip { .. } => OrderStatus::AwaitingApproval,
            _ => OrderStatus::Completed,
        }
    }
}

/// A placed order as recorded in the order ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartLineItem>,
    pub subtotal: Decimal,
    pub transport_fee: Decimal,
    pub final_total: Decimal,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
}

impl Order {
    /// Sum of `price * quantity` over a set of line items.
    #[must_use]
    pub fn subtotal_of(items: &[CartLineItem]) -> Decimal {
        items.iter().map(CartLineItem::line_total).sum()
    }

    /// Build an order from a draft, recomputing every total from the items.
    #[must_use]
    pub fn from_draft(id: OrderId, created_at: DateTime<Utc>, draft: OrderDraft) -> Self {
        let status = draft.initial_status();
        let subtotal = Self::subtotal_of(&draft.items);
        let transport_fee = super::transport_fee(draft.payment_method.transport_zone());
        Self {
            id,
            created_at,
            final_total: subtotal + transport_fee,
            subtotal,
            transport_fee,
            items: draft.items,
            shipping: draft.shipping,
            payment_method: draft.payment_method,
            status,
        }
    }

    /// Recompute `subtotal`/`final_total` from the items, overwriting only
    /// when a stored value drifted by more than `epsilon`.
    ///
    /// Returns `true` when the order was changed.
    pub fn repair_totals(&mut self, epsilon: Decimal) -> bool {
        let subtotal = Self::subtotal_of(&self.items);
        let final_total = subtotal + self.transport_fee;
        let drifted = (self.subtotal - subtotal).abs() > epsilon
            || (self.final_total - final_total).abs() > epsilon;
        if drifted {
            self.subtotal = subtotal;
            self.final_total = final_total;
        }
        drifted
    }
}
