//! Read-only view of the stored customer session.
//!
//! Login and token issuance belong to the auth collaborator; this engine
//! only reads what that collaborator persisted. Checkout uses the session
//! for its login gate and to prefill the shipping form.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;

use crate::storage::{self, StoragePort, keys};

/// Stored customer profile, as written by the auth collaborator.
///
/// Every field is optional: an older or partial profile never blocks
/// checkout, it just prefills less.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "phone")]
    pub phone_number: Option<String>,
}

/// Reader over the persisted session keys.
#[derive(Clone)]
pub struct CustomerSession {
    storage: Arc<dyn StoragePort>,
}

impl CustomerSession {
    #[must_use]
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// The stored bearer token, if a customer is logged in.
    ///
    /// Blank tokens count as logged out.
    pub async fn auth_token(&self) -> Option<SecretString> {
        match self.storage.get(keys::AUTH_TOKEN).await {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(SecretString::from(raw)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read auth token; treating as logged out");
                None
            }
        }
    }

    /// Whether a customer session is currently active.
    pub async fn is_authenticated(&self) -> bool {
        self.auth_token().await.is_some()
    }

    /// The stored customer profile, if present and parseable.
    pub async fn profile(&self) -> Option<CustomerProfile> {
        let value = storage::read_json(self.storage.as_ref(), keys::USER).await?;
        match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "stored customer profile does not parse; ignoring");
                None
            }
        }
    }
}
