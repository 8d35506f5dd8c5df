//! # Remote Price Source
//!
//! Prices SKUs by asking an external price service over an injected HTTP
//! transport.
//!
//! ## Request / Response
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lookup({"My SKU 1", "My SKU 2"})                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {base_url}?skus=%5B%22My+SKU+1%22%2C%22My+SKU+2%22%5D               │
//! │       │              └── url-encoded JSON array of SKUs                 │
//! │       ▼                                                                 │
//! │  200 {"My SKU 1": 100.00, "My SKU 2": 19.99}  → Priced(map)             │
//! │  200 {"My SKU 1": 100.00}                     → "My SKU 2" unpriced     │
//! │  any other status                             → Unavailable             │
//! │  transport error / malformed body             → Unavailable             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No retries and no timeout here: the transport owns both.

use std::collections::{BTreeSet, HashMap};

use reprice_core::validation::validate_price_cents;
use reprice_core::{Money, PriceLookup, PriceSource};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_SKU_PARAM: &str = "skus";

// =============================================================================
// Transport Seam
// =============================================================================

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Blocking GET. Implementations own connection handling, timeouts and TLS.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &Url) -> ClientResult<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn get(&self, url: &Url) -> ClientResult<HttpResponse> {
        (**self).get(url)
    }
}

// =============================================================================
// Remote Price Source
// =============================================================================

/// [`PriceSource`] backed by the external price service.
#[derive(Debug, Clone)]
pub struct RemotePriceSource<T> {
    endpoint: Url,
    sku_param: String,
    transport: T,
}

impl<T: HttpTransport> RemotePriceSource<T> {
    /// Creates a source for `base_url`, which must be an http(s) URL.
    pub fn new(base_url: &str, sku_param: impl Into<String>, transport: T) -> ClientResult<Self> {
        let endpoint = Url::parse(base_url)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "Price service URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let sku_param = sku_param.into();
        if sku_param.is_empty() {
            return Err(ClientError::InvalidConfig(
                "sku query parameter name must not be empty".into(),
            ));
        }

        Ok(RemotePriceSource {
            endpoint,
            sku_param,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds the request URL carrying `skus` as a JSON array.
    pub fn request_url(&self, skus: &BTreeSet<String>) -> ClientResult<Url> {
        let encoded = serde_json::to_string(skus)?;
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(&self.sku_param, &encoded);
        Ok(url)
    }

    /// Performs the request, keeping the failure cause for logging.
    pub fn fetch(&self, skus: &BTreeSet<String>) -> ClientResult<HashMap<String, Money>> {
        let url = self.request_url(skus)?;
        debug!(%url, skus = skus.len(), "Requesting prices");

        let response = self.transport.get(&url)?;
        if !response.is_ok() {
            return Err(ClientError::UnexpectedStatus(response.status));
        }

        decode_prices(&response.body)
    }
}

impl<T: HttpTransport> PriceSource for RemotePriceSource<T> {
    fn lookup(&self, skus: &BTreeSet<String>) -> PriceLookup {
        match self.fetch(skus) {
            Ok(prices) => PriceLookup::Priced(prices),
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "Price lookup failed");
                PriceLookup::Unavailable
            }
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decodes a `{sku: price}` JSON object.
///
/// Prices may be JSON numbers or decimal strings. A `null` price leaves the
/// SKU unpriced. Any other value, or a price outside the accepted range,
/// fails the whole body.
pub fn decode_prices(body: &str) -> ClientResult<HashMap<String, Money>> {
    let raw: HashMap<String, Value> = serde_json::from_str(body)?;

    let mut prices = HashMap::with_capacity(raw.len());
    for (sku, value) in raw {
        let text = match &value {
            Value::Null => continue,
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.clone(),
            other => {
                return Err(ClientError::InvalidPrice {
                    sku,
                    reason: format!("expected a decimal, got {}", other),
                })
            }
        };

        let price = Money::parse_decimal(&text)
            .and_then(|price| validate_price_cents(price.cents()).map(|_| price))
            .map_err(|err| ClientError::InvalidPrice {
                sku: sku.clone(),
                reason: err.to_string(),
            })?;
        prices.insert(sku, price);
    }

    Ok(prices)
}

// =============================================================================
// Unit Tests
// =============================================================================
