//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `INVENTORY_API_URL` - Base URL of the inventory API (serves `/stock/{id}` and `/products/{id}`)
//!
//! ## Optional
//! - `INVENTORY_API_TOKEN` - Bearer token sent to the inventory API
//! - `INVENTORY_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `PRODUCT_CACHE_TTL_SECS` - Product metadata cache lifetime (default: 300)
//! - `CART_STORE_DIR` - Directory holding saved carts (default: .rocketcart)
//! - `CART_STORAGE_KEY` - Key the cart is saved under (default: @RocketShoes:cart)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Storage key used by earlier storefront clients; kept so saved carts survive.
pub const DEFAULT_CART_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_CACHE_TTL_SECS: &str = "300";
const DEFAULT_STORE_DIR: &str = ".rocketcart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Inventory API configuration
    pub inventory: InventoryConfig,
    /// Directory the file store writes saved carts into
    pub store_dir: PathBuf,
    /// Key the cart blob is saved under
    pub storage_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Inventory API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct InventoryConfig {
    /// Base URL, e.g. `http://localhost:3333`
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product metadata stays cached
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl InventoryConfig {
    /// Configuration with default timeout and cache lifetime.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout: Duration::from_secs(10),
            product_cache_ttl: Duration::from_secs(300),
        }
    }
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let inventory = InventoryConfig::from_env(&env)?;
        let store_dir = PathBuf::from(env.or_default("CART_STORE_DIR", DEFAULT_STORE_DIR));
        let storage_key = env.or_default("CART_STORAGE_KEY", DEFAULT_CART_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            inventory,
            store_dir,
            storage_key,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl InventoryConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let raw_url = env.required("INVENTORY_API_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("INVENTORY_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "INVENTORY_API_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let timeout_secs = env.seconds("INVENTORY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "INVENTORY_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let ttl_secs = env.seconds("PRODUCT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            base_url,
            api_token: env.optional("INVENTORY_API_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(timeout_secs),
            product_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a whole number of seconds.
    fn seconds(&self, key: &str, default: &str) -> Result<u64, ConfigError> {
        self.or_default(key, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("INVENTORY_API_URL", "http://localhost:3333")]).unwrap();
        assert_eq!(config.inventory.base_url.as_str(), "http://localhost:3333/");
        assert!(config.inventory.api_token.is_none());
        assert_eq!(config.inventory.timeout, Duration::from_secs(10));
        assert_eq!(config.inventory.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.store_dir, PathBuf::from(".rocketcart"));
        assert_eq!(config.storage_key, DEFAULT_CART_STORAGE_KEY);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_inventory_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "INVENTORY_API_URL"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = load(&[("INVENTORY_API_URL", "ftp://inventory")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = load(&[
            ("INVENTORY_API_URL", "http://localhost:3333"),
            ("INVENTORY_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "INVENTORY_TIMEOUT_SECS"));
    }

    #[test]
    fn test_rejects_unparseable_ttl() {
        let err = load(&[
            ("INVENTORY_API_URL", "http://localhost:3333"),
            ("PRODUCT_CACHE_TTL_SECS", "five minutes"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("INVENTORY_API_URL", "https://inventory.example.com/api/"),
            ("INVENTORY_API_TOKEN", "tok_abc"),
            ("INVENTORY_TIMEOUT_SECS", "3"),
            ("CART_STORE_DIR", "/var/lib/rocketcart"),
            ("CART_STORAGE_KEY", "shopper-1"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(
            config.inventory.api_token.as_ref().unwrap().expose_secret(),
            "tok_abc"
        );
        assert_eq!(config.inventory.timeout, Duration::from_secs(3));
        assert_eq!(config.store_dir, PathBuf::from("/var/lib/rocketcart"));
        assert_eq!(config.storage_key, "shopper-1");
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_inventory_config_debug_redacts_token() {
        let mut config = InventoryConfig::new(Url::parse("http://localhost:3333").unwrap());
        config.api_token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:3333"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
