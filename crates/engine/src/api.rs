//! Backend orders API client.
//!
//! The backend is the system of record for administrative order actions;
//! order deletion must round-trip through it before local state changes.
//! Requests authenticate with the bearer token the auth collaborator stores
//! in the session.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

use genzsport_core::{Order, OrderId};

use crate::session::CustomerSession;

/// Errors that can occur when interacting with the orders API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No stored auth token, or the backend rejected it.
    #[error("Not authenticated")]
    Unauthorized,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Orders API client.
#[derive(Debug, Clone)]
pub struct OrdersApi {
    client: reqwest::Client,
    base_url: String,
}

impl OrdersApi {
    /// Create a new orders API client against `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the authenticated customer's orders.
    ///
    /// Entries that do not parse as orders are skipped rather than failing
    /// the whole fetch.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unauthorized`] on a 401, or an error for other
    /// non-success statuses and transport failures.
    pub async fn fetch_orders(&self, token: &SecretString) -> Result<Vec<Order>, RemoteError> {
        let url = format!("{}/api/orders", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if status.as_u16() == 401 {
            return Err(RemoteError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let entries: Vec<Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        let orders = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Order>(entry) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable remote order");
                    None
                }
            })
            .collect();
        Ok(orders)
    }

    /// Delete an order on the backend.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unauthorized`] on a 401, or an error for other
    /// non-success statuses and transport failures.
    pub async fn delete_order(
        &self,
        token: &SecretString,
        id: &OrderId,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/api/orders/{id}", self.base_url);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if status.as_u16() == 401 {
            return Err(RemoteError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Backend confirmation seam for order deletion.
///
/// The ledger only removes an order locally after this confirms; tests
/// substitute a stub.
#[async_trait]
pub trait OrdersBackend: Send + Sync {
    /// Confirm deletion of `id` with the backend.
    async fn delete_order(&self, id: &OrderId) -> Result<(), RemoteError>;
}

/// [`OrdersBackend`] over the real API, authenticating from the stored
/// session token.
#[derive(Clone)]
pub struct RemoteOrders {
    api: OrdersApi,
    session: CustomerSession,
}

impl RemoteOrders {
    #[must_use]
    pub const fn new(api: OrdersApi, session: CustomerSession) -> Self {
        Self { api, session }
    }
}

#[async_trait]
impl OrdersBackend for RemoteOrders {
    async fn delete_order(&self, id: &OrderId) -> Result<(), RemoteError> {
        let token = self
            .session
            .auth_token()
            .await
            .ok_or(RemoteError::Unauthorized)?;
        self.api.delete_order(&token, id).await
    }
}
