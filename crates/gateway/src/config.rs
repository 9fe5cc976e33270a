//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESTOCK_CATALOG_URL` - Base URL of the upstream catalog service
//!
//! ## Optional
//! - `RESTOCK_NOTIFY_URL` - Base URL of the upstream notification service
//!   (default: the catalog URL; the vendor runs both behind one host)
//! - `RESTOCK_HOST` - Bind address (default: 127.0.0.1)
//! - `RESTOCK_PORT` - Listen port (default: 3000)
//! - `RESTOCK_DATA_DIR` - Durable subscription storage directory (default: data)
//! - `RESTOCK_UPSTREAM_TIMEOUT_SECS` - Outbound request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gateway application configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the upstream catalog service (serves /all and /available)
    pub catalog_url: String,
    /// Base URL of the upstream notification service (serves /notify and /notify/remove)
    pub notify_url: String,
    /// Directory holding the durable subscription store
    pub data_dir: PathBuf,
    /// Timeout applied to every outbound upstream call
    pub upstream_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl GatewayConfig {
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

        let host = get_env_or_default("RESTOCK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RESTOCK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("RESTOCK_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("RESTOCK_PORT".to_string(), e.to_string()))?;

        let catalog_url = get_base_url("RESTOCK_CATALOG_URL", get_required_env("RESTOCK_CATALOG_URL")?)?;
        let notify_url = match get_optional_env("RESTOCK_NOTIFY_URL") {
            Some(raw) => get_base_url("RESTOCK_NOTIFY_URL", raw)?,
            None => catalog_url.clone(),
        };

        let data_dir = PathBuf::from(get_env_or_default("RESTOCK_DATA_DIR", "data"));
        let timeout_secs = get_env_or_default("RESTOCK_UPSTREAM_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("RESTOCK_UPSTREAM_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            catalog_url,
            notify_url,
            data_dir,
            upstream_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and normalize it (no trailing slash).
fn get_base_url(key: &str, raw: String) -> Result<String, ConfigError> {
    let url = Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
