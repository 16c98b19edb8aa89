//! Engine composition root.

use std::sync::Arc;

use genzsport_core::{Order, OrderId};

use crate::api::{OrdersApi, RemoteOrders};
use crate::cart::CartStore;
use crate::checkout::CheckoutOrchestrator;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::orders::OrderLedger;
use crate::session::CustomerSession;
use crate::storage::{FileStorage, StoragePort};
use crate::wishlist::WishlistStore;

/// The assembled commerce engine: one storage port shared by the cart,
/// wishlist, and order ledger, plus the session reader and backend client.
pub struct CommerceEngine {
    config: EngineConfig,
    cart: CartStore,
    wishlist: WishlistStore,
    ledger: OrderLedger,
    session: CustomerSession,
    api: OrdersApi,
    backend: RemoteOrders,
}

impl CommerceEngine {
    /// Initialize with the file-backed store from `config.data_dir`.
    ///
    /// All stores finish loading their persisted snapshots before this
    /// returns; mutators only exist on an initialized engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Persistence`] when the data directory cannot
    /// be created.
    pub async fn init(config: EngineConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.data_dir).await?;
        Ok(Self::with_storage(config, Arc::new(storage)).await)
    }

    /// Initialize over an explicit storage adapter.
    pub async fn with_storage(config: EngineConfig, storage: Arc<dyn StoragePort>) -> Self {
        let cart = CartStore::load(Arc::clone(&storage)).await;
        let wishlist = WishlistStore::load(Arc::clone(&storage)).await;
        let ledger = OrderLedger::load(Arc::clone(&storage), config.approval_delay).await;
        let session = CustomerSession::new(storage);
        let api = OrdersApi::new(config.api_base_url.clone());
        let backend = RemoteOrders::new(api.clone(), session.clone());
        Self {
            config,
            cart,
            wishlist,
            ledger,
            session,
            api,
            backend,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn session(&self) -> &CustomerSession {
        &self.session
    }

    /// Start a checkout session, prefilled from the stored profile.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::State`] when no customer session is active or
    /// the cart is empty.
    pub async fn begin_checkout(&self) -> Result<CheckoutOrchestrator> {
        if !self.session.is_authenticated().await {
            return Err(EngineError::State(
                "checkout requires an active customer session".to_owned(),
            ));
        }
        if self.cart.snapshot().await.is_empty() {
            return Err(EngineError::State("cannot check out an empty cart".to_owned()));
        }
        let profile = self.session.profile().await;
        Ok(CheckoutOrchestrator::new(
            self.cart.clone(),
            self.ledger.clone(),
            self.config.processing_delay,
            profile.as_ref(),
        ))
    }

    /// Delete an order, confirming with the backend first.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::NotFound`] and remote failures; the local
    /// ledger is untouched unless the backend confirms.
    pub async fn delete_order(&self, id: &OrderId) -> Result<()> {
        self.ledger.delete_order(&self.backend, id).await
    }

    /// Fetch the authenticated customer's orders from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Remote`] with `Unauthorized` when no session
    /// is active.
    pub async fn fetch_remote_orders(&self) -> Result<Vec<Order>> {
        let token = self
            .session
            .auth_token()
            .await
            .ok_or(crate::api::RemoteError::Unauthorized)?;
        Ok(self.api.fetch_orders(&token).await?)
    }

    /// Abort pending approval timers. Call before teardown so a deleted
    /// ledger is never resurrected by a stray timer.
    pub async fn shutdown(&self) {
        self.ledger.shutdown().await;
    }
}
