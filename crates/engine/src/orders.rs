//! Order ledger.
//!
//! The authoritative, persisted collection of placed orders. Totals are
//! recomputed from line items at recording time and healed by an idempotent
//! repair pass on load; a caller-supplied total is never trusted. Bank-slip
//! orders carry a scheduled approval timer that advances them to `Approved`
//! exactly once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use genzsport_core::{Order, OrderDraft, OrderId, OrderStatus};

use crate::api::OrdersBackend;
use crate::error::{EngineError, Result};
use crate::storage::{self, StoragePort, keys};

/// Tolerance for the repair pass; smaller drift is left alone.
fn repair_epsilon() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

struct Inner {
    storage: Arc<dyn StoragePort>,
    orders: Mutex<Vec<Order>>,
    tx: watch::Sender<Vec<Order>>,
    timers: Mutex<HashMap<OrderId, JoinHandle<()>>>,
    approval_delay: Duration,
}

/// Cloneable handle to the order ledger.
#[derive(Clone)]
pub struct OrderLedger {
    inner: Arc<Inner>,
}

impl OrderLedger {
    /// Load the ledger from its persisted snapshot.
    ///
    /// Entries that do not parse as orders are dropped. The repair pass
    /// runs on every load, and approval timers are rescheduled for orders
    /// still awaiting approval so a reload never strands them.
    pub async fn load(storage: Arc<dyn StoragePort>, approval_delay: Duration) -> Self {
        let orders: Vec<Order> = match storage::read_json(storage.as_ref(), keys::ORDERS).await {
            Some(serde_json::Value::Array(raw)) => raw
                .into_iter()
                .filter_map(|value| match serde_json::from_value(value) {
                    Ok(order) => Some(order),
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping unparseable persisted order");
                        None
                    }
                })
                .collect(),
            Some(_) => {
                tracing::warn!("persisted orders are not an array; starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let (tx, _) = watch::channel(orders.clone());
        let ledger = Self {
            inner: Arc::new(Inner {
                storage,
                orders: Mutex::new(orders),
                tx,
                timers: Mutex::new(HashMap::new()),
                approval_delay,
            }),
        };

        let repaired = ledger.repair_totals().await;
        if repaired > 0 {
            tracing::info!(repaired, "repaired drifted order totals on load");
        }

        let awaiting: Vec<OrderId> = ledger
            .inner
            .orders
            .lock()
            .await
            .iter()
            .filter(|order| order.status == OrderStatus::AwaitingApproval)
            .map(|order| order.id.clone())
            .collect();
        for id in awaiting {
            ledger.schedule_approval(id).await;
        }

        ledger
    }

    /// All orders, most recent first.
    pub async fn orders(&self) -> Vec<Order> {
        self.inner.orders.lock().await.clone()
    }

    /// Look up a single order.
    pub async fn order(&self, id: &OrderId) -> Option<Order> {
        self.inner
            .orders
            .lock()
            .await
            .iter()
            .find(|order| &order.id == id)
            .cloned()
    }

    /// Subscribe to ledger changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.inner.tx.subscribe()
    }

    /// Record a new order from `draft`, recomputing every total from its
    /// items, and prepend it to the ledger.
    ///
    /// Bank-slip orders start `AwaitingApproval` and get an approval timer;
    /// everything else records as `Completed`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the draft has no items.
    #[tracing::instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn record_order(&self, draft: OrderDraft) -> Result<Order> {
        if draft.items.is_empty() {
            return Err(EngineError::Validation(
                "cannot record an order with no items".to_owned(),
            ));
        }

        let mut orders = self.inner.orders.lock().await;
        let id = Self::fresh_id(&orders);
        let order = Order::from_draft(id, Utc::now(), draft);
        orders.insert(0, order.clone());
        self.commit(orders).await;

        tracing::info!(id = %order.id, status = ?order.status, total = %order.final_total, "recorded order");
        if order.status == OrderStatus::AwaitingApproval {
            self.schedule_approval(order.id.clone()).await;
        }
        Ok(order)
    }

    /// Generate an order id not already present in the ledger.
    #[allow(clippy::cast_sign_loss)] // timestamp_millis is positive for any present-day clock
    fn fresh_id(orders: &[Order]) -> OrderId {
        let stamp = Utc::now().timestamp_millis() as u64;
        loop {
            let suffix = rand::rng().random_range(0..1000);
            let id = OrderId::from_parts(stamp, suffix);
            if !orders.iter().any(|order| order.id == id) {
                return id;
            }
        }
    }

    /// Move an awaiting order to `Approved`.
    ///
    /// Returns `true` when the order was advanced. A missing order or one
    /// that already left `AwaitingApproval` is a no-op returning `false`;
    /// the transition applies at most once.
    #[tracing::instrument(skip(self))]
    pub async fn advance_approval(&self, id: &OrderId) -> bool {
        let mut orders = self.inner.orders.lock().await;
        let Some(order) = orders.iter_mut().find(|order| &order.id == id) else {
            tracing::debug!(%id, "approval for unknown order; ignoring");
            return false;
        };

        if !order.status.can_transition(OrderStatus::Approved) {
            return false;
        }
        order.status = OrderStatus::Approved;
        self.commit(orders).await;
        tracing::info!(%id, "order approved");
        true
    }

    /// Schedule the simulated approval for `id` after the configured delay.
    ///
    /// Single-flight per order: a second call while a timer is pending is a
    /// no-op.
    pub async fn schedule_approval(&self, id: OrderId) {
        let mut timers = self.inner.timers.lock().await;
        if timers.contains_key(&id) {
            return;
        }
        let ledger = self.clone();
        let timer_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ledger.inner.approval_delay).await;
            ledger.advance_approval(&timer_id).await;
            ledger.inner.timers.lock().await.remove(&timer_id);
        });
        timers.insert(id, handle);
    }

    /// Recompute stored totals from each order's items, overwriting only
    /// values that drifted by more than the repair tolerance.
    ///
    /// Idempotent: a second call right after the first changes nothing.
    /// Returns the number of orders repaired.
    pub async fn repair_totals(&self) -> usize {
        let mut orders = self.inner.orders.lock().await;
        let epsilon = repair_epsilon();
        let repaired = orders
            .iter_mut()
            .map(|order| order.repair_totals(epsilon))
            .filter(|repaired| *repaired)
            .count();
        if repaired > 0 {
            self.commit(orders).await;
        }
        repaired
    }

    /// Delete an order, round-tripping through the backend first.
    ///
    /// Local state is untouched until the backend confirms; a remote
    /// failure leaves the order in place.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown id, or
    /// [`EngineError::Remote`] when the backend rejects the deletion.
    #[tracing::instrument(skip(self, backend))]
    pub async fn delete_order(&self, backend: &dyn OrdersBackend, id: &OrderId) -> Result<()> {
        if self.order(id).await.is_none() {
            return Err(EngineError::NotFound(format!("order {id}")));
        }

        backend.delete_order(id).await?;

        if let Some(handle) = self.inner.timers.lock().await.remove(id) {
            handle.abort();
        }
        let mut orders = self.inner.orders.lock().await;
        orders.retain(|order| &order.id != id);
        self.commit(orders).await;
        tracing::info!(%id, "deleted order");
        Ok(())
    }

    /// Abort all pending approval timers.
    pub async fn shutdown(&self) {
        let mut timers = self.inner.timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    async fn commit(&self, orders: tokio::sync::MutexGuard<'_, Vec<Order>>) {
        storage::write_json(self.inner.storage.as_ref(), keys::ORDERS, &*orders).await;
        let snapshot = orders.clone();
        drop(orders);
        self.inner.tx.send_replace(snapshot);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::RemoteError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use genzsport_core::{CartLineItem, PaymentMethod, ShippingInfo, SlipImage, TransportZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_secs(10);

    fn items(price: i64, quantity: u32) -> Vec<CartLineItem> {
        vec![CartLineItem::new("p1", "Bat", Decimal::from(price), quantity)]
    }

    fn draft(payment_method: PaymentMethod) -> OrderDraft {
        OrderDraft {
            items: items(1000, 1),
            shipping: ShippingInfo::parse("John Doe", "123 Main St", "0712345678").unwrap(),
            payment_method,
        }
    }

    fn cash(zone: TransportZone) -> PaymentMethod {
        PaymentMethod::CashOnDelivery { zone }
    }

    fn bank_slip() -> PaymentMethod {
        PaymentMethod::BankSlip {
            slip: SlipImage {
                filename: "slip.png".to_owned(),
                media_type: "image/png".to_owned(),
                bytes: vec![1, 2, 3],
            },
        }
    }

    async fn empty_ledger() -> OrderLedger {
        OrderLedger::load(Arc::new(MemoryStorage::new()), DELAY).await
    }

    #[tokio::test]
    async fn test_record_is_total_authoritative() {
        let ledger = empty_ledger().await;
        let order = ledger
            .record_order(draft(cash(TransportZone::OutOfZone)))
            .await
            .unwrap();
        assert_eq!(order.subtotal, Decimal::from(1000));
        assert_eq!(order.transport_fee, Decimal::from(800));
        assert_eq!(order.final_total, Decimal::from(1800));
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(OrderId::parse(order.id.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_orders_are_most_recent_first() {
        let ledger = empty_ledger().await;
        let first = ledger
            .record_order(draft(cash(TransportZone::InZone)))
            .await
            .unwrap();
        let second = ledger
            .record_order(draft(cash(TransportZone::InZone)))
            .await
            .unwrap();
        let orders = ledger.orders().await;
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
    }

    #[tokio::test]
    async fn test_empty_draft_rejected() {
        let ledger = empty_ledger().await;
        let mut empty = draft(cash(TransportZone::InZone));
        empty.items.clear();
        assert!(matches!(
            ledger.record_order(empty).await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bank_slip_approves_after_delay_exactly_once() {
        let ledger = empty_ledger().await;
        let order = ledger.record_order(draft(bank_slip())).await.unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingApproval);

        tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
        let order = ledger.order(&order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Approved);

        // The transition applies at most once.
        assert!(!ledger.advance_approval(&order.id).await);
        assert_eq!(
            ledger.order(&order.id).await.unwrap().status,
            OrderStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_advance_unknown_order_is_noop() {
        let ledger = empty_ledger().await;
        ledger
            .record_order(draft(cash(TransportZone::InZone)))
            .await
            .unwrap();

        let unknown = OrderId::parse("GZ-000000-999").unwrap();
        assert!(!ledger.advance_approval(&unknown).await);
        assert_eq!(ledger.orders().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cash_orders_get_no_timer() {
        let ledger = empty_ledger().await;
        let order = ledger
            .record_order(draft(cash(TransportZone::InZone)))
            .await
            .unwrap();
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(
            ledger.order(&order.id).await.unwrap().status,
            OrderStatus::Completed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_reschedules_pending_approval() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = OrderLedger::load(Arc::clone(&storage) as Arc<dyn StoragePort>, DELAY).await;
        let order = ledger.record_order(draft(bank_slip())).await.unwrap();
        ledger.shutdown().await;

        let reloaded = OrderLedger::load(storage, DELAY).await;
        tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
        assert_eq!(
            reloaded.order(&order.id).await.unwrap().status,
            OrderStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_repair_heals_corrupted_totals_idempotently() {
        let storage = Arc::new(MemoryStorage::new());
        // A persisted order carrying the historical corrupted-total bug.
        storage
            .set(
                keys::ORDERS,
                r#"[{
                    "id":"GZ-123456-001",
                    "createdAt":"2026-01-15T10:00:00Z",
                    "items":[{"id":"p1","name":"Bat","price":"1000","quantity":2,"image":"","category":""}],
                    "subtotal":"1000",
                    "transportFee":"500",
                    "finalTotal":"99999",
                    "shipping":{"fullName":"John","address":"A","phoneNumber":"0712345678"},
                    "paymentMethod":{"method":"cash_on_delivery","zone":"in_zone"},
                    "status":"completed"
                }]"#,
            )
            .await
            .unwrap();

        let ledger = OrderLedger::load(storage, DELAY).await;
        let orders = ledger.orders().await;
        assert_eq!(orders[0].subtotal, Decimal::from(2000));
        assert_eq!(orders[0].final_total, Decimal::from(2500));

        // Load already repaired; a second explicit pass changes nothing.
        assert_eq!(ledger.repair_totals().await, 0);
    }

    #[tokio::test]
    async fn test_load_drops_unparseable_entries() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(keys::ORDERS, r#"[{"id":"not an order"},42]"#)
            .await
            .unwrap();
        let ledger = OrderLedger::load(storage, DELAY).await;
        assert!(ledger.orders().await.is_empty());
    }

    /// Backend stub counting confirmations.
    struct StubBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubBackend {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl OrdersBackend for StubBackend {
        async fn delete_order(&self, _id: &OrderId) -> std::result::Result<(), RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RemoteError::Api {
                    status: 500,
                    message: "backend down".to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_delete_round_trips_through_backend() {
        let ledger = empty_ledger().await;
        let order = ledger
            .record_order(draft(cash(TransportZone::InZone)))
            .await
            .unwrap();

        let backend = StubBackend::new(false);
        ledger.delete_order(&backend, &order.id).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(ledger.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_order() {
        let ledger = empty_ledger().await;
        let order = ledger
            .record_order(draft(cash(TransportZone::InZone)))
            .await
            .unwrap();

        let backend = StubBackend::new(true);
        let err = ledger.delete_order(&backend, &order.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Remote(_)));
        assert_eq!(ledger.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_order_skips_backend() {
        let ledger = empty_ledger().await;
        let backend = StubBackend::new(false);
        let id = OrderId::parse("GZ-000000-000").unwrap();
        let err = ledger.delete_order(&backend, &id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reload_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = OrderLedger::load(Arc::clone(&storage) as Arc<dyn StoragePort>, DELAY).await;
        let order = ledger
            .record_order(draft(cash(TransportZone::OutOfZone)))
            .await
            .unwrap();

        let reloaded = OrderLedger::load(storage, DELAY).await;
        let orders = reloaded.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order.id);
        assert_eq!(orders[0].final_total, Decimal::from(1800));
    }
}
