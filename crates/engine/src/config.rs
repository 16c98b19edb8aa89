//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `GENZSPORT_API_BASE_URL` - Backend API base URL (default: <http://localhost:8082>)
//! - `GENZSPORT_DATA_DIR` - Directory for the file-backed store (default: .genzsport)
//! - `GENZSPORT_PROCESSING_DELAY_MS` - Simulated order-processing delay (default: 2000)
//! - `GENZSPORT_APPROVAL_DELAY_MS` - Bank-slip approval delay (default: 10000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Commerce engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Backend API base URL (no trailing slash).
    pub api_base_url: String,
    /// Directory for the file-backed persistence adapter.
    pub data_dir: PathBuf,
    /// Simulated delay between submitting checkout and recording the order.
    pub processing_delay: Duration,
    /// Delay before a bank-slip order is approved.
    pub approval_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8082".to_owned(),
            data_dir: PathBuf::from(".genzsport"),
            processing_delay: Duration::from_millis(2000),
            approval_delay: Duration::from_millis(10_000),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a delay variable is present but not a valid
    /// number of milliseconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let api_base_url = std::env::var("GENZSPORT_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or(defaults.api_base_url);
        let data_dir = std::env::var("GENZSPORT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let processing_delay =
            get_duration_ms("GENZSPORT_PROCESSING_DELAY_MS", defaults.processing_delay)?;
        let approval_delay =
            get_duration_ms("GENZSPORT_APPROVAL_DELAY_MS", defaults.approval_delay)?;

        Ok(Self {
            api_base_url,
            data_dir,
            processing_delay,
            approval_delay,
        })
    }
}

/// Get an optional millisecond-duration environment variable.
fn get_duration_ms(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}
