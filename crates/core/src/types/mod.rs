//! Domain types for the GenZsport commerce engine.
//!
//! Persisted snapshots are JSON; the `from_persisted` constructors in this
//! module normalize or drop malformed records once, at the storage boundary,
//! so the stores never have to carry defensive fallbacks of their own.

mod cart;
mod de;
mod order;
mod payment;
mod shipping;
mod wishlist;

pub use cart::CartLineItem;
pub use order::{Order, OrderDraft, OrderId, OrderIdError, OrderStatus};
pub use payment::{PaymentKind, PaymentMethod, SlipImage, TransportZone, transport_fee};
pub use shipping::{ShippingFieldErrors, ShippingInfo};
pub use wishlist::WishlistEntry;
