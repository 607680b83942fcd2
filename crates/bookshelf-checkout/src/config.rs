//! # Checkout Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOOKSHELF_CURRENCY=EUR                                             │
//! │     BOOKSHELF_PAYMENT_LATENCY_MS=0                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bookshelf/checkout.toml (Linux)                          │
//! │     ~/Library/Application Support/com.bookshelf.bookshelf/… (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     USD, 2 s simulated latency, 10 s timeout                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [checkout]
//! default_currency = "USD"
//! supported_currencies = ["USD", "EUR"]
//!
//! [payment]
//! latency_ms = 2000
//! timeout_ms = 10000
//! # decline_reason = "card declined"   # makes the simulator fail
//! # outage = "maintenance window"       # makes the simulator unreachable
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use bookshelf_core::Currency;

use crate::error::{CheckoutError, CheckoutResult};

/// Environment variable names.
pub const ENV_CURRENCY: &str = "BOOKSHELF_CURRENCY";
pub const ENV_PAYMENT_LATENCY_MS: &str = "BOOKSHELF_PAYMENT_LATENCY_MS";
pub const ENV_PAYMENT_TIMEOUT_MS: &str = "BOOKSHELF_PAYMENT_TIMEOUT_MS";
pub const ENV_DECLINE_REASON: &str = "BOOKSHELF_DECLINE_REASON";
pub const ENV_PAYMENT_OUTAGE: &str = "BOOKSHELF_PAYMENT_OUTAGE";

// =============================================================================
// Checkout Settings
// =============================================================================

/// Currency settings for checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Currency preselected in the cart.
    #[serde(default)]
    pub default_currency: Currency,

    /// Currencies a shopper may pay in.
    #[serde(default = "default_supported_currencies")]
    pub supported_currencies: Vec<Currency>,
}

fn default_supported_currencies() -> Vec<Currency> {
    ["USD", "EUR"]
        .iter()
        .filter_map(|code| code.parse().ok())
        .collect()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            default_currency: Currency::default(),
            supported_currencies: default_supported_currencies(),
        }
    }
}

// =============================================================================
// Payment Settings
// =============================================================================

/// Payment collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    /// Simulated provider round-trip (milliseconds).
    #[serde(default = "default_latency")]
    pub latency_ms: u64,

    /// Give up on the provider after this long (milliseconds).
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// When set, the simulated provider declines every charge with this
    /// reason. Handy for exercising the failure dialog.
    #[serde(default)]
    pub decline_reason: Option<String>,

    /// When set, the simulated provider reports itself unavailable with
    /// this message. Takes precedence over `decline_reason`.
    #[serde(default)]
    pub outage: Option<String>,
}

fn default_latency() -> u64 {
    2000
}

fn default_timeout() -> u64 {
    10_000
}

impl Default for PaymentSettings {
    fn default() -> Self {
        PaymentSettings {
            latency_ms: default_latency(),
            timeout_ms: default_timeout(),
            decline_reason: None,
            outage: None,
        }
    }
}

// =============================================================================
// Main Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub payment: PaymentSettings,
}

impl CheckoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Checkout config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        if self.checkout.supported_currencies.is_empty() {
            return Err(CheckoutError::InvalidConfig(
                "supported_currencies must not be empty".into(),
            ));
        }

        if !self.is_supported(&self.checkout.default_currency) {
            return Err(CheckoutError::InvalidConfig(format!(
                "default_currency {} is not in supported_currencies",
                self.checkout.default_currency
            )));
        }

        if self.payment.timeout_ms == 0 {
            return Err(CheckoutError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source. Unparseable values are
    /// logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(code) = lookup(ENV_CURRENCY) {
            match code.parse::<Currency>() {
                Ok(currency) => {
                    debug!(currency = %currency, "Overriding default currency from environment");
                    if !self.is_supported(&currency) {
                        self.checkout.supported_currencies.push(currency.clone());
                    }
                    self.checkout.default_currency = currency;
                }
                Err(e) => warn!(code = %code, error = %e, "Ignoring invalid currency override"),
            }
        }

        if let Some(latency) = lookup(ENV_PAYMENT_LATENCY_MS) {
            match latency.parse::<u64>() {
                Ok(ms) => self.payment.latency_ms = ms,
                Err(_) => warn!(value = %latency, "Ignoring invalid payment latency override"),
            }
        }

        if let Some(timeout) = lookup(ENV_PAYMENT_TIMEOUT_MS) {
            match timeout.parse::<u64>() {
                Ok(ms) => self.payment.timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring invalid payment timeout override"),
            }
        }

        if let Some(reason) = lookup(ENV_DECLINE_REASON) {
            self.payment.decline_reason = non_blank(reason);
        }

        if let Some(message) = lookup(ENV_PAYMENT_OUTAGE) {
            self.payment.outage = non_blank(message);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bookshelf", "bookshelf")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn is_supported(&self, currency: &Currency) -> bool {
        self.checkout.supported_currencies.contains(currency)
    }

    pub fn default_currency(&self) -> &Currency {
        &self.checkout.default_currency
    }

    pub fn payment_latency(&self) -> Duration {
        Duration::from_millis(self.payment.latency_ms)
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_millis(self.payment.timeout_ms)
    }
}

/// Empty or whitespace-only override values clear the setting.
fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
