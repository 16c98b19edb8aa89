//! Order ledger lifecycle: repair on load, backend-confirmed deletion,
//! timer cancellation, and invoice export.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use genzsport_core::{OrderId, OrderStatus, PaymentKind, SlipImage, TransportZone};
use genzsport_engine::api::{OrdersBackend, RemoteError};
use genzsport_engine::checkout::ShippingInput;
use genzsport_engine::invoice::render_invoice;
use genzsport_engine::storage::{MemoryStorage, StoragePort, keys};
use genzsport_engine::{CommerceEngine, EngineError};
use genzsport_integration_tests::{engine_with_session, line_item, test_config};

struct AcceptingBackend;

#[async_trait]
impl OrdersBackend for AcceptingBackend {
    async fn delete_order(&self, _id: &OrderId) -> Result<(), RemoteError> {
        Ok(())
    }
}

struct RejectingBackend;

#[async_trait]
impl OrdersBackend for RejectingBackend {
    async fn delete_order(&self, _id: &OrderId) -> Result<(), RemoteError> {
        Err(RemoteError::Api {
            status: 503,
            message: "maintenance".to_owned(),
        })
    }
}

fn shipping() -> ShippingInput {
    ShippingInput {
        full_name: "Jane Doe".to_owned(),
        address: "12 Galle Rd".to_owned(),
        phone_number: "0712345678".to_owned(),
    }
}

async fn place_cash_order(engine: &CommerceEngine, price: i64) -> genzsport_core::Order {
    engine.cart().add_item(line_item("p1", price, 1)).await.unwrap();
    let mut checkout = engine.begin_checkout().await.unwrap();
    checkout.submit_shipping_info(&shipping()).unwrap();
    checkout
        .select_payment_method(PaymentKind::CashOnDelivery)
        .unwrap();
    checkout
        .select_transport_zone(TransportZone::InZone)
        .unwrap();
    checkout.complete_order().await.unwrap()
}

// =============================================================================
// Repair On Load
// =============================================================================

#[tokio::test]
async fn test_corrupted_totals_heal_on_load() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            keys::ORDERS,
            r#"[{
                "id":"GZ-654321-002",
                "createdAt":"2026-02-01T08:30:00Z",
                "items":[
                    {"id":"p1","name":"Bat","price":"55000","quantity":1,"image":"","category":""},
                    {"id":"p2","name":"Ball","price":"500","quantity":2,"image":"","category":""}
                ],
                "subtotal":"12",
                "transportFee":"800",
                "finalTotal":"34",
                "shipping":{"fullName":"Jane","address":"A","phoneNumber":"0712345678"},
                "paymentMethod":{"method":"cash_on_delivery","zone":"out_of_zone"},
                "status":"completed"
            }]"#,
        )
        .await
        .unwrap();

    let engine =
        CommerceEngine::with_storage(test_config(), Arc::clone(&storage) as Arc<dyn StoragePort>)
            .await;
    let orders = engine.orders().orders().await;
    assert_eq!(orders[0].subtotal, Decimal::from(56_000));
    assert_eq!(orders[0].final_total, Decimal::from(56_800));

    // Idempotent: nothing left to fix.
    assert_eq!(engine.orders().repair_totals().await, 0);
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_delete_confirmed_by_backend() {
    let (engine, _storage) = engine_with_session().await;
    let order = place_cash_order(&engine, 1000).await;

    engine
        .orders()
        .delete_order(&AcceptingBackend, &order.id)
        .await
        .unwrap();
    assert!(engine.orders().orders().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_backend_rejection_keeps_local_view() {
    let (engine, _storage) = engine_with_session().await;
    let order = place_cash_order(&engine, 1000).await;

    let err = engine
        .orders()
        .delete_order(&RejectingBackend, &order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Remote(_)));
    assert_eq!(engine.orders().orders().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deleting_awaiting_order_cancels_its_timer() {
    let (engine, _storage) = engine_with_session().await;
    engine.cart().add_item(line_item("p1", 500, 1)).await.unwrap();

    let mut checkout = engine.begin_checkout().await.unwrap();
    checkout.submit_shipping_info(&shipping()).unwrap();
    checkout.select_payment_method(PaymentKind::BankSlip).unwrap();
    checkout
        .attach_slip(SlipImage {
            filename: "slip.png".to_owned(),
            media_type: "image/png".to_owned(),
            bytes: vec![1],
        })
        .unwrap();
    let order = checkout.complete_order().await.unwrap();
    assert_eq!(order.status, OrderStatus::AwaitingApproval);

    engine
        .orders()
        .delete_order(&AcceptingBackend, &order.id)
        .await
        .unwrap();

    // The pending approval must not resurrect the deleted order.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(engine.orders().orders().await.is_empty());
}

// =============================================================================
// Invoice Export
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_invoice_renders_from_stored_order() {
    let (engine, _storage) = engine_with_session().await;
    let order = place_cash_order(&engine, 1000).await;

    let html = render_invoice(&order).unwrap();
    assert!(html.contains(order.id.as_str()));
    assert!(html.contains("Jane Doe"));
    assert!(html.contains("Rs 1000.00"));
    assert!(html.contains("Rs 500.00"));
    assert!(html.contains("Rs 1500.00"));
    assert!(html.contains("In Southern Province"));
    assert!(html.contains("Cash on Delivery"));
}
