//! Unified error handling for the commerce engine.
//!
//! Validation failures are local and recoverable; persistence failures are
//! logged and non-fatal (the in-memory state stays authoritative for the
//! session); remote failures leave local state untouched until the backend
//! confirms. No error path is allowed to corrupt a derived total.

use thiserror::Error;

use crate::api::RemoteError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input shape or range; surfaced as an operation-scoped message.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// Backend call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Operation invalid for the current stage or session state.
    #[error("Invalid state: {0}")]
    State(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
