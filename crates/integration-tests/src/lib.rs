//! Integration tests for the GenZsport commerce engine.
//!
//! The tests in `tests/` drive the assembled [`CommerceEngine`] over an
//! in-memory storage adapter, exercising the cart, checkout, and order
//! lifecycle end to end without a backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p genzsport-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;

use genzsport_core::CartLineItem;
use genzsport_engine::CommerceEngine;
use genzsport_engine::config::EngineConfig;
use genzsport_engine::storage::{MemoryStorage, StoragePort, keys};

/// Config with short, deterministic delays for paused-time tests.
#[must_use]
pub fn test_config() -> EngineConfig {
    EngineConfig::default()
}

/// Engine over a fresh in-memory store with a logged-in session seeded.
pub async fn engine_with_session() -> (CommerceEngine, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(keys::AUTH_TOKEN, "jwt-test-token").await.unwrap();
    storage
        .set(
            keys::USER,
            r#"{"fullName":"Jane Doe","address":"12 Galle Rd","phoneNumber":"0712345678"}"#,
        )
        .await
        .unwrap();
    let engine = CommerceEngine::with_storage(
        test_config(),
        Arc::clone(&storage) as Arc<dyn StoragePort>,
    )
    .await;
    (engine, storage)
}

/// Engine over a fresh in-memory store with no session.
pub async fn engine_logged_out() -> (CommerceEngine, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let engine = CommerceEngine::with_storage(
        test_config(),
        Arc::clone(&storage) as Arc<dyn StoragePort>,
    )
    .await;
    (engine, storage)
}

/// A line item with empty image/category metadata.
#[must_use]
pub fn line_item(id: &str, price: i64, quantity: u32) -> CartLineItem {
    CartLineItem::new(id, format!("Product {id}"), Decimal::from(price), quantity)
}
