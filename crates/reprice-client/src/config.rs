//! # Pricing Configuration
//!
//! Which price source a deployment uses and how it is set up.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     REPRICE_SOURCE=remote                                              │
//! │     REPRICE_REMOTE_URL=https://prices.internal/v1/prices               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/reprice/pricing.toml (Linux)                             │
//! │     ~/Library/Application Support/com.reprice.reprice/pricing.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     static table, missing SKUs left unpriced                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [source]
//! mode = "remote"  # static | remote
//!
//! [static_table]
//! price_missing_skus_by_default = false
//! default_price_cents = 1000
//!
//! [remote]
//! base_url = "https://prices.internal/v1/prices"
//! sku_param = "skus"
//! timeout_secs = 5
//!
//! [locale]
//! fallback = "en"
//! ```
//!
//! Configuration is read once at startup; a pricing pass never re-reads it.

use reprice_core::locale::DEFAULT_FALLBACK_LOCALE;
use reprice_core::validation::validate_price_cents;
use reprice_core::StaticTableConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::remote::DEFAULT_SKU_PARAM;

// =============================================================================
// Source Mode
// =============================================================================

/// Which price source backs the checkout reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Fixed in-process price table.
    #[default]
    Static,
    /// External price service.
    Remote,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Static => write!(f, "static"),
            SourceMode::Remote => write!(f, "remote"),
        }
    }
}

impl std::str::FromStr for SourceMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" | "table" | "mock" => Ok(SourceMode::Static),
            "remote" | "service" | "http" => Ok(SourceMode::Remote),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown price source: '{}'. Valid options: static, remote",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub mode: SourceMode,
}

/// Settings for the external price service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Price endpoint; SKUs are appended as a query parameter.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Name of the query parameter carrying the SKU list.
    #[serde(default = "default_sku_param")]
    pub sku_param: String,

    /// Request timeout applied by the transport (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_sku_param() -> String {
    DEFAULT_SKU_PARAM.to_string()
}

fn default_timeout() -> u64 {
    5
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: None,
            sku_param: default_sku_param(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleSettings {
    /// Locale used when the buyer's locale has no message entry.
    #[serde(default = "default_fallback_locale")]
    pub fallback: String,
}

fn default_fallback_locale() -> String {
    DEFAULT_FALLBACK_LOCALE.to_string()
}

impl Default for LocaleSettings {
    fn default() -> Self {
        LocaleSettings {
            fallback: default_fallback_locale(),
        }
    }
}

// =============================================================================
// Main Pricing Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub static_table: StaticTableConfig,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub locale: LocaleSettings,
}

impl PricingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if self.source.mode == SourceMode::Remote {
            let url = self.remote.base_url.as_deref().ok_or_else(|| {
                ClientError::InvalidConfig("remote mode requires remote.base_url".into())
            })?;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::InvalidUrl(format!(
                    "Price service URL must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if self.remote.sku_param.is_empty() {
            return Err(ClientError::InvalidConfig(
                "remote.sku_param must not be empty".into(),
            ));
        }

        if self.remote.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "remote.timeout_secs must be greater than 0".into(),
            ));
        }

        validate_price_cents(self.static_table.default_price_cents).map_err(|e| {
            ClientError::InvalidConfig(format!("static_table.default_price_cents: {}", e))
        })?;

        for (sku, cents) in &self.static_table.prices {
            validate_price_cents(*cents).map_err(|e| {
                ClientError::InvalidConfig(format!("static_table price for '{}': {}", sku, e))
            })?;
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = var("REPRICE_SOURCE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding price source from environment");
                    self.source.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown price source in environment"),
            }
        }

        if let Some(url) = var("REPRICE_REMOTE_URL") {
            debug!(url = %url, "Overriding price service URL from environment");
            self.remote.base_url = Some(url);
        }

        if let Some(flag) = var("REPRICE_PRICE_MISSING_BY_DEFAULT") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.static_table.price_missing_skus_by_default = true,
                "0" | "false" | "no" => self.static_table.price_missing_skus_by_default = false,
                _ => warn!(value = %flag, "Unrecognized REPRICE_PRICE_MISSING_BY_DEFAULT"),
            }
        }

        if let Some(cents) = var("REPRICE_DEFAULT_PRICE_CENTS") {
            if let Ok(c) = cents.parse::<i64>() {
                self.static_table.default_price_cents = c;
            }
        }

        if let Some(locale) = var("REPRICE_FALLBACK_LOCALE") {
            self.locale.fallback = locale;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "reprice", "reprice")
            .map(|dirs| dirs.config_dir().join("pricing.toml"))
    }

    pub fn mode(&self) -> SourceMode {
        self.source.mode
    }
}
