//! Cart behavior through the assembled engine: merge-by-id totals,
//! persistence round-trips, and wishlist interplay.

use std::sync::Arc;

use rust_decimal::Decimal;

use genzsport_core::WishlistEntry;
use genzsport_engine::CommerceEngine;
use genzsport_engine::storage::{StoragePort, keys};
use genzsport_engine::wishlist::Toggle;
use genzsport_integration_tests::{engine_logged_out, line_item, test_config};

// =============================================================================
// Cart Totals
// =============================================================================

#[tokio::test]
async fn test_add_item_merges_and_totals_follow() {
    let (engine, _storage) = engine_logged_out().await;

    let snap = engine
        .cart()
        .add_item(line_item("c1", 55_000, 1))
        .await
        .unwrap();
    assert_eq!(snap.total_items, 1);
    assert_eq!(snap.total_price, Decimal::from(55_000));

    let snap = engine
        .cart()
        .add_item(line_item("c1", 55_000, 2))
        .await
        .unwrap();
    assert_eq!(snap.items.len(), 1);
    assert_eq!(snap.total_items, 3);
    assert_eq!(snap.total_price, Decimal::from(165_000));
}

#[tokio::test]
async fn test_totals_hold_across_mutation_sequences() {
    let (engine, _storage) = engine_logged_out().await;
    let cart = engine.cart();

    cart.add_item(line_item("a", 100, 2)).await.unwrap();
    cart.add_item(line_item("b", 300, 1)).await.unwrap();
    cart.update_quantity("b", 3).await;
    cart.remove_item("a").await;
    cart.add_item(line_item("c", 50, 4)).await.unwrap();

    let snap = cart.snapshot().await;
    let expected_items: u32 = snap.items.iter().map(|item| item.quantity).sum();
    let expected_price: Decimal = snap.items.iter().map(|item| item.line_total()).sum();
    assert_eq!(snap.total_items, expected_items);
    assert_eq!(snap.total_price, expected_price);
    assert_eq!(snap.total_items, 7);
    assert_eq!(snap.total_price, Decimal::from(1100));
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_cart_survives_engine_restart() {
    let (engine, storage) = engine_logged_out().await;
    engine.cart().add_item(line_item("c1", 55_000, 2)).await.unwrap();

    let reloaded =
        CommerceEngine::with_storage(test_config(), Arc::clone(&storage) as Arc<dyn StoragePort>)
            .await;
    let snap = reloaded.cart().snapshot().await;
    assert_eq!(snap.total_items, 2);
    assert_eq!(snap.total_price, Decimal::from(110_000));
}

#[tokio::test]
async fn test_corrupt_persisted_cart_loads_empty() {
    let (_, storage) = engine_logged_out().await;
    storage.set(keys::CART, "{definitely not json").await.unwrap();

    let engine =
        CommerceEngine::with_storage(test_config(), Arc::clone(&storage) as Arc<dyn StoragePort>)
            .await;
    assert!(engine.cart().snapshot().await.is_empty());

    // The engine stays usable after a corrupt load.
    engine.cart().add_item(line_item("c1", 100, 1)).await.unwrap();
    assert_eq!(engine.cart().snapshot().await.total_items, 1);
}

// =============================================================================
// Wishlist
// =============================================================================

fn entry(id: &str) -> WishlistEntry {
    let item = line_item(id, 900, 1);
    WishlistEntry {
        id: item.id,
        name: item.name,
        price: item.price,
        image: item.image,
        category: item.category,
        added_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn test_wishlist_toggle_into_cart() {
    let (engine, _storage) = engine_logged_out().await;

    assert_eq!(
        engine.wishlist().toggle(entry("w1")).await.unwrap(),
        Toggle::Added
    );
    assert!(engine.wishlist().contains("w1").await);

    // Move to cart the way a product page would.
    let entries = engine.wishlist().entries().await;
    engine
        .cart()
        .add_item(entries[0].to_cart_item())
        .await
        .unwrap();
    assert_eq!(
        engine.wishlist().toggle(entry("w1")).await.unwrap(),
        Toggle::Removed
    );

    assert_eq!(engine.cart().snapshot().await.total_items, 1);
    assert!(!engine.wishlist().contains("w1").await);
}

#[tokio::test]
async fn test_wishlist_and_cart_use_distinct_keys() {
    let (engine, storage) = engine_logged_out().await;
    engine.cart().add_item(line_item("p", 10, 1)).await.unwrap();
    engine.wishlist().add(entry("w")).await.unwrap();

    let cart_blob = storage.get(keys::CART).await.unwrap().unwrap();
    let wishlist_blob = storage.get(keys::WISHLIST).await.unwrap().unwrap();
    assert!(cart_blob.contains("\"p\""));
    assert!(!cart_blob.contains("\"w\""));
    assert!(wishlist_blob.contains("\"w\""));
}
