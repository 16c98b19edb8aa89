//! Wishlist store.
//!
//! Same persistence and validation discipline as the cart, but with set
//! semantics: no duplicate product ids, and `toggle` flips membership.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use genzsport_core::WishlistEntry;

use crate::error::{EngineError, Result};
use crate::storage::{self, StoragePort, keys};

/// Outcome of a [`WishlistStore::toggle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

struct Inner {
    storage: Arc<dyn StoragePort>,
    entries: Mutex<Vec<WishlistEntry>>,
    tx: watch::Sender<Vec<WishlistEntry>>,
}

/// Cloneable handle to the wishlist store.
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<Inner>,
}

impl WishlistStore {
    /// Load the wishlist from its persisted snapshot, dropping entries that
    /// fail validation.
    pub async fn load(storage: Arc<dyn StoragePort>) -> Self {
        let now = chrono::Utc::now();
        let entries = match storage::read_json(storage.as_ref(), keys::WISHLIST).await {
            Some(serde_json::Value::Array(raw)) => raw
                .iter()
                .filter_map(|value| WishlistEntry::from_persisted(value, now))
                .collect(),
            Some(_) => {
                tracing::warn!("persisted wishlist is not an array; starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };
        let (tx, _) = watch::channel(entries.clone());
        Self {
            inner: Arc::new(Inner {
                storage,
                entries: Mutex::new(entries),
                tx,
            }),
        }
    }

    /// Current entries, most recently listed last.
    pub async fn entries(&self) -> Vec<WishlistEntry> {
        self.inner.entries.lock().await.clone()
    }

    /// Subscribe to wishlist changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<WishlistEntry>> {
        self.inner.tx.subscribe()
    }

    /// Whether `id` is currently wishlisted.
    pub async fn contains(&self, id: &str) -> bool {
        self.inner
            .entries
            .lock()
            .await
            .iter()
            .any(|entry| entry.id == id)
    }

    /// Add `entry` if its id is not already present.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when `entry.id` is empty.
    #[tracing::instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn add(&self, entry: WishlistEntry) -> Result<()> {
        if entry.id.trim().is_empty() {
            return Err(EngineError::Validation(
                "cannot wishlist an item without an id".to_owned(),
            ));
        }
        let mut entries = self.inner.entries.lock().await;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Ok(());
        }
        entries.push(entry);
        self.commit(entries).await;
        Ok(())
    }

    /// Remove the entry with `id`; unknown ids are a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) {
        let mut entries = self.inner.entries.lock().await;
        entries.retain(|entry| entry.id != id);
        self.commit(entries).await;
    }

    /// Add `entry` if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when `entry.id` is empty.
    #[tracing::instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn toggle(&self, entry: WishlistEntry) -> Result<Toggle> {
        if entry.id.trim().is_empty() {
            return Err(EngineError::Validation(
                "cannot wishlist an item without an id".to_owned(),
            ));
        }
        let mut entries = self.inner.entries.lock().await;
        let outcome = if entries.iter().any(|existing| existing.id == entry.id) {
            entries.retain(|existing| existing.id != entry.id);
            Toggle::Removed
        } else {
            entries.push(entry);
            Toggle::Added
        };
        self.commit(entries).await;
        Ok(outcome)
    }

    /// Empty the wishlist and remove the persisted snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) {
        let mut entries = self.inner.entries.lock().await;
        entries.clear();
        if let Err(e) = self.inner.storage.remove(keys::WISHLIST).await {
            tracing::warn!(error = %e, "failed to remove persisted wishlist");
        }
        drop(entries);
        self.inner.tx.send_replace(Vec::new());
    }

    async fn commit(&self, entries: tokio::sync::MutexGuard<'_, Vec<WishlistEntry>>) {
        storage::write_json(self.inner.storage.as_ref(), keys::WISHLIST, &*entries).await;
        let snapshot = entries.clone();
        drop(entries);
        self.inner.tx.send_replace(snapshot);
    }
}
