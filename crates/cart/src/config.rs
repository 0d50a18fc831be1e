//! Cart sync configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_REMOTE_URL` - Base URL of the remote cart API
//!
//! ## Optional
//! - `CART_REMOTE_TOKEN` - Bearer token for the remote cart API
//! - `CART_REMOTE_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `CART_LOCAL_DIR` - Directory for device-local snapshots (default: .orderdesk/carts)
//! - `CART_PERSIST_DEBOUNCE_MS` - Quiet period before a remote write (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `text` or `json` (default: text)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default quiet period before the remote cart is written.
pub const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_millis(2000);

const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOCAL_DIR: &str = ".orderdesk/carts";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Cart sync configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Remote cart API settings
    pub remote: RemoteConfig,
    /// Directory holding device-local snapshots
    pub local_dir: PathBuf,
    /// Quiet period before a remote write
    pub persist_debounce: Duration,
    /// Telemetry settings
    pub telemetry: TelemetryConfig,
}

/// Remote cart API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Base URL; carts live under `{base_url}/users/{id}/cart`
    pub base_url: Url,
    /// Bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Logging and error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

impl CartConfig {
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

        let persist_debounce = get_optional_env("CART_PERSIST_DEBOUNCE_MS")
            .map(|v| parse_env::<u64>("CART_PERSIST_DEBOUNCE_MS", &v))
            .transpose()?
            .map_or(DEFAULT_PERSIST_DEBOUNCE, Duration::from_millis);

        Ok(Self {
            remote: RemoteConfig::from_env()?,
            local_dir: PathBuf::from(get_env_or_default("CART_LOCAL_DIR", DEFAULT_LOCAL_DIR)),
            persist_debounce,
            telemetry: TelemetryConfig::from_env()?,
        })
    }
}

impl RemoteConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("CART_REMOTE_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CART_REMOTE_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "CART_REMOTE_URL".to_string(),
                format!("unsupported scheme {}", base_url.scheme()),
            ));
        }

        let timeout_secs = parse_env::<u64>(
            "CART_REMOTE_TIMEOUT_SECS",
            &get_env_or_default(
                "CART_REMOTE_TIMEOUT_SECS",
                &DEFAULT_REMOTE_TIMEOUT_SECS.to_string(),
            ),
        )?;

        Ok(Self {
            base_url,
            token: get_optional_env("CART_REMOTE_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl TelemetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let log_format = match get_env_or_default("LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected text or json, got {other}"),
                ));
            }
        };

        Ok(Self {
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            log_format,
        })
    }

    /// Telemetry settings from the environment, falling back to defaults.
    ///
    /// For binaries that log before (or without) loading a full config.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env().unwrap_or_default()
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env() {
        assert_eq!(parse_env::<u64>("X", " 2500 ").ok(), Some(2500));
        assert!(matches!(
            parse_env::<u64>("X", "soon"),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "X"
        ));
    }

    #[test]
    fn test_remote_config_debug_redacts_token() {
        let config = RemoteConfig {
            base_url: Url::parse("https://carts.example.test").unwrap(),
            token: Some(SecretString::from("tok_live_123")),
            timeout: Duration::from_secs(10),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok_live_123"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("CART_REMOTE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: CART_REMOTE_URL"
        );
    }
}
