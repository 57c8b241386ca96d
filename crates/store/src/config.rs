//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BISTRO_DATA_DIR` - Directory for persisted documents (default: .bistro)
//! - `BISTRO_CATALOG_PATH` - Catalog JSON document (default: data/menu-data.json)
//! - `BISTRO_SUBMIT_LATENCY_MS` - Simulated order submission delay (default: 1000)
//! - `BISTRO_STATUS_LATENCY_MS` - Simulated status update delay (default: 500)
//! - `BISTRO_STRICT_TRANSITIONS` - Reject steps outside the status graph (default: false)
//! - `BISTRO_TAX_RATE` - Tax as a fraction of the subtotal (default: 0.08)
//! - `BISTRO_FREE_DELIVERY_THRESHOLD` - Subtotal that ships free (default: 50.00)
//! - `BISTRO_DELIVERY_FEE` - Fee below the threshold (default: 5.99)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bistro_core::Price;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::orders::{OrderConfig, TransitionPolicy};
use crate::pricing::Pricing;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Everything needed to open the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Where the cart and order ledger are persisted
    pub data_dir: PathBuf,
    /// Catalog document loaded at startup
    pub catalog_path: PathBuf,
    /// Order latencies and transition policy
    pub orders: OrderConfig,
    /// Tax and delivery rules for the cart summary
    pub pricing: Pricing,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".bistro"),
            catalog_path: PathBuf::from("data/menu-data.json"),
            orders: OrderConfig::default(),
            pricing: Pricing::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);
        let defaults = Self::default();

        let orders = OrderConfig {
            submit_latency: env.millis("BISTRO_SUBMIT_LATENCY_MS", defaults.orders.submit_latency)?,
            status_latency: env.millis("BISTRO_STATUS_LATENCY_MS", defaults.orders.status_latency)?,
            policy: if env.flag("BISTRO_STRICT_TRANSITIONS")? {
                TransitionPolicy::Strict
            } else {
                TransitionPolicy::Permissive
            },
        };

        let pricing = Pricing {
            tax_rate: env.rate("BISTRO_TAX_RATE", defaults.pricing.tax_rate)?,
            free_delivery_threshold: env.price(
                "BISTRO_FREE_DELIVERY_THRESHOLD",
                defaults.pricing.free_delivery_threshold,
            )?,
            delivery_fee: env.price("BISTRO_DELIVERY_FEE", defaults.pricing.delivery_fee)?,
        };

        Ok(Self {
            data_dir: env.get("BISTRO_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            catalog_path: env
                .get("BISTRO_CATALOG_PATH")
                .map_or(defaults.catalog_path, PathBuf::from),
            orders,
            pricing,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Parse an optional variable with `FromStr`.
    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    fn millis(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        Ok(self
            .parse::<u64>(key)?
            .map_or(default, Duration::from_millis))
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.get(key).map(|value| value.to_lowercase()).as_deref() {
            None | Some("0" | "false" | "no" | "off") => Ok(false),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some(other) => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected true or false, got '{other}'"),
            )),
        }
    }

    fn rate(&self, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        match self.parse::<Decimal>(key)? {
            None => Ok(default),
            Some(rate) if rate.is_sign_negative() && !rate.is_zero() => Err(
                ConfigError::InvalidEnvVar(key.to_string(), "must not be negative".to_string()),
            ),
            Some(rate) => Ok(rate),
        }
    }

    fn price(&self, key: &str, default: Price) -> Result<Price, ConfigError> {
        self.parse::<Decimal>(key)?.map_or(Ok(default), |amount| {
            Price::new(amount)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}
