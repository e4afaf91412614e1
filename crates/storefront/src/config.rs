//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BRIMLINE_API_URL` - Backend base URL (default: `http://localhost:7000/api`)
//! - `BRIMLINE_STATE_DIR` - Directory holding persisted store state (default: `.brimline`)
//! - `BRIMLINE_PAYMENT_DELAY_MS` - Simulated payment processing delay (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN (CLI only)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend origin, matching the development API server.
pub const DEFAULT_API_URL: &str = "http://localhost:7000/api";

/// Default directory for persisted store state.
pub const DEFAULT_STATE_DIR: &str = ".brimline";

/// Default simulated payment delay in milliseconds.
pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 2000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL; endpoint paths are appended to it
    pub api_url: Url,
    /// Directory for persisted store state
    pub state_dir: PathBuf,
    /// Simulated payment processing time at checkout
    pub payment_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL"),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            payment_delay: Duration::from_millis(DEFAULT_PAYMENT_DELAY_MS),
            sentry_dsn: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(
            &lookup("BRIMLINE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let state_dir = lookup("BRIMLINE_STATE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let payment_delay_ms = match lookup("BRIMLINE_PAYMENT_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("BRIMLINE_PAYMENT_DELAY_MS".to_string(), e.to_string())
            })?,
            None => DEFAULT_PAYMENT_DELAY_MS,
        };
        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            api_url,
            state_dir,
            payment_delay: Duration::from_millis(payment_delay_ms),
            sentry_dsn,
        })
    }
}

/// Parse and sanity-check the backend URL.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("BRIMLINE_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "BRIMLINE_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}
