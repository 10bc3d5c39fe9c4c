//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MERCADO_API_BASE_URL` - Base URL of the Mercado REST backend
//!
//! ## Optional
//! - `MERCADO_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `MERCADO_STORAGE_PATH` - Path for the file-backed local store (the CLI
//!   falls back to a per-user data directory when unset)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend. Always ends with a slash so endpoint
    /// paths join under it instead of replacing the final path segment.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Path for the file-backed local store, when configured.
    pub storage_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_required_env("MERCADO_API_BASE_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("MERCADO_API_BASE_URL".to_owned(), e))?;

        let timeout_secs = get_env_or_default(
            "MERCADO_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("MERCADO_API_TIMEOUT_SECS".to_owned(), e.to_string())
        })?;

        let storage_path = get_optional_env("MERCADO_STORAGE_PATH").map(PathBuf::from);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            storage_path,
        })
    }

    /// Build a config directly, normalizing the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)
                .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_owned(), e))?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_path: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse and normalize a backend base URL.
///
/// Rejects non-http(s) schemes and appends a trailing slash when missing,
/// because `Url::join` on a slash-less base would swallow the last path
/// segment.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }

    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }

    Ok(url)
}
