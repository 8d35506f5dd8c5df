//! # Message Catalog
//!
//! Localized templates for pricing annotations.
//!
//! ## Lookup Order
//! ```text
//! requested "fr-CA"
//!      │
//!      ├── exact entry "fr-ca"?      → use it
//!      ├── primary subtag "fr"?      → use it
//!      └── fallback locale ("en")    → always present
//! ```
//!
//! Locale tags are compared case-insensitively with `_` treated as `-`.
//! Adding a locale is a call to [`MessageCatalog::register`], not a code
//! change in the reconciler.

use std::collections::HashMap;

/// Placeholder replaced by the SKU in item-level templates.
pub const SKU_PLACEHOLDER: &str = "{sku}";

pub const DEFAULT_FALLBACK_LOCALE: &str = "en";

/// Message identifiers used by the pricing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// The price service could not price the cart at all.
    PricingUnavailable,
    /// One SKU has no price. Template carries [`SKU_PLACEHOLDER`].
    ItemPriceUnavailable,
}

/// Templates for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleMessages {
    pub pricing_unavailable: String,
    pub item_price_unavailable: String,
}

impl LocaleMessages {
    pub fn new(pricing_unavailable: impl Into<String>, item_price_unavailable: impl Into<String>) -> Self {
        LocaleMessages {
            pricing_unavailable: pricing_unavailable.into(),
            item_price_unavailable: item_price_unavailable.into(),
        }
    }

    fn template(&self, key: MessageKey) -> &str {
        match key {
            MessageKey::PricingUnavailable => &self.pricing_unavailable,
            MessageKey::ItemPriceUnavailable => &self.item_price_unavailable,
        }
    }

    fn english() -> Self {
        LocaleMessages::new(
            "We were unable to retrieve prices for your cart. Please try again later.",
            "The price for item {sku} is currently unavailable.",
        )
    }

    fn french() -> Self {
        LocaleMessages::new(
            "Nous n'avons pas pu obtenir les prix de votre panier. Veuillez réessayer plus tard.",
            "Le prix de l'article {sku} est actuellement indisponible.",
        )
    }
}

/// Locale-keyed message table with a guaranteed fallback entry.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, LocaleMessages>,
    fallback: String,
    fallback_messages: LocaleMessages,
}

impl MessageCatalog {
    /// Built-in English and French entries, falling back to English.
    pub fn builtin() -> Self {
        let mut catalog = MessageCatalog {
            entries: HashMap::new(),
            fallback: DEFAULT_FALLBACK_LOCALE.to_string(),
            fallback_messages: LocaleMessages::english(),
        };
        catalog.register("en", LocaleMessages::english());
        catalog.register("fr", LocaleMessages::french());
        catalog
    }

    /// Switches the fallback locale.
    ///
    /// Ignored (returns false) if no entry exists for `locale`, so the
    /// catalog can never end up without a fallback.
    pub fn set_fallback(&mut self, locale: &str) -> bool {
        let key = normalize(locale);
        match self.entries.get(&key) {
            Some(messages) => {
                self.fallback_messages = messages.clone();
                self.fallback = key;
                true
            }
            None => false,
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Adds or replaces the entry for `locale`.
    pub fn register(&mut self, locale: &str, messages: LocaleMessages) {
        let key = normalize(locale);
        if key == self.fallback {
            self.fallback_messages = messages.clone();
        }
        self.entries.insert(key, messages);
    }

    /// Returns the templates that serve `locale`.
    pub fn messages_for(&self, locale: &str) -> &LocaleMessages {
        let key = normalize(locale);
        self.entries
            .get(&key)
            .or_else(|| {
                key.split_once('-')
                    .and_then(|(primary, _)| self.entries.get(primary))
            })
            .unwrap_or(&self.fallback_messages)
    }

    /// Renders the cart-level failure message.
    pub fn pricing_unavailable(&self, locale: &str) -> String {
        self.messages_for(locale)
            .template(MessageKey::PricingUnavailable)
            .to_string()
    }

    /// Renders the per-item failure message for `sku`.
    pub fn item_price_unavailable(&self, locale: &str, sku: &str) -> String {
        self.messages_for(locale)
            .template(MessageKey::ItemPriceUnavailable)
            .replace(SKU_PLACEHOLDER, sku)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

// =============================================================================
// Unit Tests
// =============================================================================
