//! GenZsport commerce engine.
//!
//! The client-side state engine behind the GenZsport storefront: the
//! shopping cart, the wishlist, and the checkout/order lifecycle, with
//! persisted recovery across sessions. Rendering, catalog retrieval, and
//! token issuance are external collaborators; this crate owns only the
//! commerce state and its invariants.
//!
//! # Modules
//!
//! - [`storage`] - Durable key-value persistence port and adapters
//! - [`cart`] - Cart store with recomputed totals
//! - [`wishlist`] - Wishlist store with set semantics
//! - [`orders`] - Order ledger with total repair and approval timers
//! - [`checkout`] - Checkout orchestrator state machine
//! - [`session`] - Read-only view of the stored customer session
//! - [`api`] - Backend orders API client
//! - [`invoice`] - Printable invoice export
//! - [`config`] - Environment configuration
//!
//! # Usage
//!
//! ```rust,no_run
//! use genzsport_engine::{CommerceEngine, config::EngineConfig};
//!
//! # async fn run() -> genzsport_engine::error::Result<()> {
//! let engine = CommerceEngine::init(EngineConfig::from_env()?).await?;
//! let mut checkout = engine.begin_checkout().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
mod engine;
pub mod error;
pub mod filters;
pub mod invoice;
pub mod orders;
pub mod session;
pub mod storage;
pub mod wishlist;

pub use engine::CommerceEngine;
pub use error::{EngineError, Result};
