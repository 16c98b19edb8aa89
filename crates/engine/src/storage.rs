//! Durable key-value persistence port.
//!
//! Every stateful component persists its snapshot through [`StoragePort`],
//! a string-keyed blob store, and owns exactly one key from [`keys`]. The
//! port carries no domain meaning; schema validation happens in the stores
//! when a snapshot is read back.
//!
//! Two adapters are provided: [`MemoryStorage`] for tests and ephemeral
//! sessions, and [`FileStorage`] for a durable on-disk store with one file
//! per key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Persistence keys, one namespace per component.
///
/// `user` and `authToken` are written by the auth collaborator; this engine
/// only reads them.
pub mod keys {
    pub const CART: &str = "cart";
    pub const WISHLIST: &str = "wishlist";
    pub const ORDERS: &str = "orders";
    pub const USER: &str = "user";
    pub const AUTH_TOKEN: &str = "authToken";
}

/// Storage adapter failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Generic get/set/remove interface over durable client storage.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`; absent keys are a no-op.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and parse a persisted JSON snapshot.
///
/// Read and parse failures are logged and reported as an absent snapshot;
/// a corrupt blob never aborts a store load.
pub(crate) async fn read_json(storage: &dyn StoragePort, key: &str) -> Option<serde_json::Value> {
    let raw = match storage.get(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted snapshot");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "persisted snapshot is not valid JSON; ignoring");
            None
        }
    }
}

/// Persist a JSON snapshot.
///
/// Write failures are logged and swallowed: the in-memory state remains
/// authoritative for the current session even if durability fails.
pub(crate) async fn write_json<T: Serialize + ?Sized>(
    storage: &dyn StoragePort,
    key: &str,
    value: &T,
) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to serialize snapshot");
            return;
        }
    };
    if let Err(e) = storage.set(key, &raw).await {
        tracing::warn!(key, error = %e, "failed to persist snapshot; keeping in-memory state");
    }
}

/// In-memory storage adapter.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Read(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed storage adapter: one file per key under a data directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a file store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the directory cannot be created.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Write(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal constants, but flatten anything path-like anyway.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl StoragePort for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(format!("{key}: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| StorageError::Write(format!("{key}: {e}")))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write(format!("{key}: {e}"))),
        }
    }
}
