//! GenZsport Core - Shared domain types.
//!
//! This crate provides the domain model used across the GenZsport client
//! components:
//! - `engine` - The commerce state engine (cart, wishlist, orders, checkout)
//! - `integration-tests` - Cross-component scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Cart/wishlist items, shipping info, payment methods,
//!   transport zones, and the order model with its status state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
