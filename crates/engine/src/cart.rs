//! Cart store.
//!
//! The only writer of cart line items. Derived totals are recomputed from
//! the item list on every read of a snapshot, never updated incrementally,
//! so they cannot drift from the items. One line item per product id;
//! adding an existing id increases its quantity.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, watch};

use genzsport_core::CartLineItem;

use crate::error::{EngineError, Result};
use crate::storage::{self, StoragePort, keys};

/// Immutable view of the cart with its derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    /// Sum of quantities across all line items.
    pub total_items: u32,
    /// Sum of `price * quantity` across all line items.
    pub total_price: Decimal,
}

impl CartSnapshot {
    fn of(items: &[CartLineItem]) -> Self {
        Self {
            total_items: items.iter().map(|item| item.quantity).sum(),
            total_price: items.iter().map(CartLineItem::line_total).sum(),
            items: items.to_vec(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct Inner {
    storage: Arc<dyn StoragePort>,
    // Held across the persist await so writes reach storage in mutation order.
    items: Mutex<Vec<CartLineItem>>,
    tx: watch::Sender<CartSnapshot>,
}

/// Cloneable handle to the cart store.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Load the cart from its persisted snapshot.
    ///
    /// Persisted entries that fail validation (missing id, non-array
    /// payload) are dropped rather than aborting the load. The returned
    /// store is the "initialized" gate: mutators only exist on a loaded
    /// store.
    pub async fn load(storage: Arc<dyn StoragePort>) -> Self {
        let items = match storage::read_json(storage.as_ref(), keys::CART).await {
            Some(serde_json::Value::Array(entries)) => entries
                .iter()
                .filter_map(CartLineItem::from_persisted)
                .collect(),
            Some(_) => {
                tracing::warn!("persisted cart is not an array; starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };
        let (tx, _) = watch::channel(CartSnapshot::of(&items));
        Self {
            inner: Arc::new(Inner {
                storage,
                items: Mutex::new(items),
                tx,
            }),
        }
    }

    /// Current snapshot with recomputed totals.
    pub async fn snapshot(&self) -> CartSnapshot {
        let items = self.inner.items.lock().await;
        CartSnapshot::of(&items)
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Add `item` to the cart, merging by product id.
    ///
    /// If a line with the same id exists, its quantity is incremented by
    /// `item.quantity`; otherwise the item is inserted as a new line.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when `item.id` is empty.
    #[tracing::instrument(skip(self, item), fields(id = %item.id, quantity = item.quantity))]
    pub async fn add_item(&self, item: CartLineItem) -> Result<CartSnapshot> {
        if item.id.trim().is_empty() {
            return Err(EngineError::Validation(
                "cannot add an item without an id".to_owned(),
            ));
        }
        let mut items = self.inner.items.lock().await;
        if let Some(line) = items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(item.quantity.max(1));
        } else {
            // Struct-literal items can arrive with quantity 0; the cart
            // never holds a line below quantity 1.
            items.push(CartLineItem {
                quantity: item.quantity.max(1),
                ..item
            });
        }
        Ok(self.commit(items).await)
    }

    /// Remove the line item with `id`. An empty or unknown id is a logged
    /// no-op.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, id: &str) -> CartSnapshot {
        if id.trim().is_empty() {
            tracing::warn!("ignoring remove_item with empty id");
            return self.snapshot().await;
        }
        let mut items = self.inner.items.lock().await;
        items.retain(|line| line.id != id);
        self.commit(items).await
    }

    /// Replace the stored quantity for `id`. A quantity of zero removes the
    /// line item.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(&self, id: &str, quantity: u32) -> CartSnapshot {
        let mut items = self.inner.items.lock().await;
        if quantity == 0 {
            items.retain(|line| line.id != id);
        } else if let Some(line) = items.iter_mut().find(|line| line.id == id) {
            line.quantity = quantity;
        }
        self.commit(items).await
    }

    /// Empty the cart and remove the persisted snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> CartSnapshot {
        let mut items = self.inner.items.lock().await;
        items.clear();
        let snapshot = CartSnapshot::default();
        if let Err(e) = self.inner.storage.remove(keys::CART).await {
            tracing::warn!(error = %e, "failed to remove persisted cart");
        }
        self.inner.tx.send_replace(snapshot.clone());
        drop(items);
        snapshot
    }

    /// Persist the items and publish the new snapshot.
    ///
    /// Persistence failures are logged inside `write_json` and are
    /// non-fatal: the in-memory state stays authoritative.
    async fn commit(
        &self,
        items: tokio::sync::MutexGuard<'_, Vec<CartLineItem>>,
    ) -> CartSnapshot {
        storage::write_json(self.inner.storage.as_ref(), keys::CART, &*items).await;
        let snapshot = CartSnapshot::of(&items);
        drop(items);
        self.inner.tx.send_replace(snapshot.clone());
        snapshot
    }
}
