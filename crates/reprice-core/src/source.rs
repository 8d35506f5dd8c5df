//! # Price Sources
//!
//! The `PriceSource` seam and the static-table implementation.
//!
//! ## Lookup Outcomes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lookup({"A", "B", "C"})                                                │
//! │                                                                         │
//! │  PriceLookup::Unavailable          whole batch failed (service down,    │
//! │                                    bad status, undecodable body)        │
//! │                                                                         │
//! │  PriceLookup::Priced({A: 1.00,     "C" absent → explicitly unpriced     │
//! │                       B: 0.00})    "B" present with zero → free item    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The remote implementation lives in `reprice-client`; anything that can
//! answer a batch of SKUs plugs in here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::money::Money;

// =============================================================================
// Lookup Result
// =============================================================================

/// Outcome of one batch price lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceLookup {
    /// Nothing could be priced.
    Unavailable,
    /// Resolved prices. SKUs missing from the map are unpriced.
    Priced(HashMap<String, Money>),
}

impl PriceLookup {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PriceLookup::Unavailable)
    }

    /// Price for `sku`, or `None` if the batch failed or the SKU is unpriced.
    pub fn price_of(&self, sku: &str) -> Option<Money> {
        match self {
            PriceLookup::Unavailable => None,
            PriceLookup::Priced(prices) => prices.get(sku).copied(),
        }
    }
}

// =============================================================================
// Price Source Trait
// =============================================================================

/// Resolves prices for a batch of SKUs.
///
/// Implementations never retry and never report *why* a batch failed; any
/// failure is `PriceLookup::Unavailable`. Timeouts belong to whoever owns the
/// transport underneath.
pub trait PriceSource: Send + Sync {
    /// Looks up every SKU in `skus`. Callers never pass an empty set.
    fn lookup(&self, skus: &BTreeSet<String>) -> PriceLookup;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn lookup(&self, skus: &BTreeSet<String>) -> PriceLookup {
        (**self).lookup(skus)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<S: PriceSource + ?Sized> PriceSource for std::sync::Arc<S> {
    fn lookup(&self, skus: &BTreeSet<String>) -> PriceLookup {
        (**self).lookup(skus)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// =============================================================================
// Static Table
// =============================================================================

fn default_table() -> HashMap<String, i64> {
    HashMap::from([
        ("My SKU 1".to_string(), 10000),
        ("My SKU 2".to_string(), 20000),
    ])
}

fn default_missing_price_cents() -> i64 {
    1000
}

/// Settings for [`StaticPriceSource`].
///
/// ## Example (TOML)
/// ```toml
/// [static_table]
/// price_missing_skus_by_default = false
/// default_price_cents = 1000
///
/// [static_table.prices]
/// "My SKU 1" = 10000
/// "My SKU 2" = 20000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTableConfig {
    /// Price unknown SKUs at `default_price_cents` instead of omitting them.
    #[serde(default)]
    pub price_missing_skus_by_default: bool,

    #[serde(default = "default_missing_price_cents")]
    pub default_price_cents: i64,

    /// SKU → price in cents.
    #[serde(default = "default_table")]
    pub prices: HashMap<String, i64>,
}

impl Default for StaticTableConfig {
    fn default() -> Self {
        StaticTableConfig {
            price_missing_skus_by_default: false,
            default_price_cents: default_missing_price_cents(),
            prices: default_table(),
        }
    }
}

/// Fixed-table price source; the cheap option used in tests and demos.
#[derive(Debug, Clone)]
pub struct StaticPriceSource {
    prices: HashMap<String, Money>,
    missing_price: Option<Money>,
}

impl StaticPriceSource {
    pub fn new(config: &StaticTableConfig) -> Self {
        StaticPriceSource {
            prices: config
                .prices
                .iter()
                .map(|(sku, cents)| (sku.clone(), Money::from_cents(*cents)))
                .collect(),
            missing_price: config
                .price_missing_skus_by_default
                .then(|| Money::from_cents(config.default_price_cents)),
        }
    }

    /// Adds or replaces a table entry.
    pub fn with_price(mut self, sku: impl Into<String>, price: Money) -> Self {
        self.prices.insert(sku.into(), price);
        self
    }
}

impl Default for StaticPriceSource {
    fn default() -> Self {
        Self::new(&StaticTableConfig::default())
    }
}

impl PriceSource for StaticPriceSource {
    fn lookup(&self, skus: &BTreeSet<String>) -> PriceLookup {
        let prices = skus
            .iter()
            .filter_map(|sku| {
                self.prices
                    .get(sku)
                    .copied()
                    .or(self.missing_price)
                    .map(|price| (sku.clone(), price))
            })
            .collect();
        PriceLookup::Priced(prices)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn skus(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_static_table_prices_known_skus() {
        let source = StaticPriceSource::default();
        let lookup = source.lookup(&skus(&["My SKU 1", "My SKU 2"]));

        assert_eq!(lookup.price_of("My SKU 1"), Some(Money::from_cents(10000)));
        assert_eq!(lookup.price_of("My SKU 2"), Some(Money::from_cents(20000)));
    }

    #[test]
    fn test_static_table_omits_unknown_sku_by_default() {
        let source = StaticPriceSource::default();
        let lookup = source.lookup(&skus(&["My SKU 1", "Unknown SKU"]));

        assert!(!lookup.is_unavailable());
        assert_eq!(lookup.price_of("Unknown SKU"), None);
        match lookup {
            PriceLookup::Priced(prices) => assert_eq!(prices.len(), 1),
            PriceLookup::Unavailable => panic!("static table never fails"),
        }
    }

    #[test]
    fn test_static_table_prices_missing_when_enabled() {
        let config = StaticTableConfig {
            price_missing_skus_by_default: true,
            default_price_cents: 4200,
            ..StaticTableConfig::default()
        };
        let lookup = StaticPriceSource::new(&config).lookup(&skus(&["Unknown SKU", "My SKU 1"]));

        assert_eq!(lookup.price_of("Unknown SKU"), Some(Money::from_cents(4200)));
        assert_eq!(lookup.price_of("My SKU 1"), Some(Money::from_cents(10000)));
    }

    #[test]
    fn test_zero_price_is_not_unpriced() {
        let source = StaticPriceSource::default().with_price("FREEBIE", Money::zero());
        let lookup = source.lookup(&skus(&["FREEBIE"]));

        assert_eq!(lookup.price_of("FREEBIE"), Some(Money::zero()));
    }

    #[test]
    fn test_unavailable_has_no_prices() {
        assert_eq!(PriceLookup::Unavailable.price_of("My SKU 1"), None);
        assert!(PriceLookup::Unavailable.is_unavailable());
    }

    #[test]
    fn test_config_from_toml_like_json() {
        let config: StaticTableConfig =
            serde_json::from_str(r#"{ "price_missing_skus_by_default": true }"#).unwrap();

        assert!(config.price_missing_skus_by_default);
        assert_eq!(config.default_price_cents, 1000);
        assert_eq!(config.prices.get("My SKU 1"), Some(&10000));
    }
}
