//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPLANE_API_BASE` - Backend base URL; overrides port detection
//! - `SHOPLANE_PORT` - Port the client believes it is served from; the
//!   development port selects the same-origin base, anything else the fixed
//!   local backend origin
//! - `SHOPLANE_DOWNLOAD_DIR` - Directory for downloaded order XML files
//!   (default: current directory)
//! - `SHOPLANE_NOTICE_TTL_SECS` - Seconds before a notice self-dismisses
//!   (default: 5)
//! - `SHOPLANE_ORDER_REDIRECT_DELAY_MS` - Delay before navigating to the
//!   orders view after a successful order (default: 1500)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Port the backend serves both the API and the UI from in development.
const DEV_PORT: u16 = 5004;

/// Fixed local backend origin used when the client is not co-hosted.
const LOCAL_BACKEND: &str = "http://127.0.0.1:5004";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the shop backend.
    pub api_base: Url,
    /// Directory downloaded order XML files are written into.
    pub download_dir: PathBuf,
    /// How long a transient notice stays visible.
    pub notice_ttl: Duration,
    /// Pause between order confirmation and the switch to the orders view.
    pub order_redirect_delay: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = match get_optional_env("SHOPLANE_API_BASE") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPLANE_API_BASE".to_owned(), e.to_string())
            })?,
            None => {
                let port = match get_optional_env("SHOPLANE_PORT") {
                    Some(raw) => Some(raw.parse::<u16>().map_err(|e| {
                        ConfigError::InvalidEnvVar("SHOPLANE_PORT".to_owned(), e.to_string())
                    })?),
                    None => None,
                };
                resolve_api_base(port)
            }
        };

        let download_dir =
            PathBuf::from(get_env_or_default("SHOPLANE_DOWNLOAD_DIR", "."));

        let notice_ttl = Duration::from_secs(
            get_env_or_default("SHOPLANE_NOTICE_TTL_SECS", "5")
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPLANE_NOTICE_TTL_SECS".to_owned(), e.to_string())
                })?,
        );

        let order_redirect_delay = Duration::from_millis(
            get_env_or_default("SHOPLANE_ORDER_REDIRECT_DELAY_MS", "1500")
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "SHOPLANE_ORDER_REDIRECT_DELAY_MS".to_owned(),
                        e.to_string(),
                    )
                })?,
        );

        Ok(Self {
            api_base,
            download_dir,
            notice_ttl,
            order_redirect_delay,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: resolve_api_base(None),
            download_dir: PathBuf::from("."),
            notice_ttl: Duration::from_secs(5),
            order_redirect_delay: Duration::from_millis(1500),
        }
    }
}

/// Pick the backend base URL from the port the client is served from.
///
/// The development port means the backend also serves the client, so the
/// same origin works; any other (or unknown) port falls back to the fixed
/// local backend origin. `SHOPLANE_API_BASE` bypasses the rule entirely.
#[must_use]
pub fn resolve_api_base(served_from_port: Option<u16>) -> Url {
    let origin = match served_from_port {
        Some(DEV_PORT) => format!("http://127.0.0.1:{DEV_PORT}"),
        _ => LOCAL_BACKEND.to_owned(),
    };
    // Both arms are valid absolute URLs.
    #[allow(clippy::unwrap_used)]
    Url::parse(&origin).unwrap()
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_base_dev_port() {
        let url = resolve_api_base(Some(5004));
        assert_eq!(url.as_str(), "http://127.0.0.1:5004/");
    }

    #[test]
    fn test_resolve_api_base_other_port() {
        let url = resolve_api_base(Some(8080));
        assert_eq!(url.as_str(), "http://127.0.0.1:5004/");
    }

    #[test]
    fn test_resolve_api_base_unknown_port() {
        let url = resolve_api_base(None);
        assert_eq!(url.as_str(), "http://127.0.0.1:5004/");
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.notice_ttl, Duration::from_secs(5));
        assert_eq!(config.order_redirect_delay, Duration::from_millis(1500));
        assert_eq!(config.download_dir, PathBuf::from("."));
    }

    #[test]
    fn test_get_env_or_default_falls_back() {
        assert_eq!(
            get_env_or_default("SHOPLANE_TEST_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
