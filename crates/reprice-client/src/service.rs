//! # Calculator Assembly
//!
//! Turns a [`PricingConfig`] into a ready-to-use cart calculator.
//!
//! ```text
//! PricingConfig ──► build_price_source ──► Box<dyn PriceSource>
//!       │                                        │
//!       └──► MessageCatalog (fallback locale)    ▼
//!                        └──────────► PricingReconciler
//!                                            │
//!                    DefaultCalculator ──► StageDispatch
//! ```

use reprice_core::{
    DefaultCalculator, MessageCatalog, PriceSource, PricingReconciler, StageDispatch,
    StaticPriceSource,
};
use tracing::{info, warn};

use crate::config::{PricingConfig, RemoteSettings, SourceMode};
use crate::error::{ClientError, ClientResult};
use crate::remote::{HttpTransport, RemotePriceSource};

/// The calculator a deployment runs.
pub type Calculator = StageDispatch<DefaultCalculator, PricingReconciler<Box<dyn PriceSource>>>;

/// Creates the transport for remote mode. Only called when it is needed.
pub type TransportFactory<'a> =
    dyn FnOnce(&RemoteSettings) -> ClientResult<Box<dyn HttpTransport>> + 'a;

/// Builds the configured price source.
pub fn build_price_source(
    config: &PricingConfig,
    transport: Box<TransportFactory<'_>>,
) -> ClientResult<Box<dyn PriceSource>> {
    match config.mode() {
        SourceMode::Static => Ok(Box::new(StaticPriceSource::new(&config.static_table))),
        SourceMode::Remote => {
            let base_url = config.remote.base_url.as_deref().ok_or_else(|| {
                ClientError::InvalidConfig("remote mode requires remote.base_url".into())
            })?;
            let transport = transport(&config.remote)?;
            let source = RemotePriceSource::new(base_url, config.remote.sku_param.clone(), transport)?;
            Ok(Box::new(source))
        }
    }
}

/// Builds the message catalog with the configured fallback locale.
pub fn build_messages(config: &PricingConfig) -> MessageCatalog {
    let mut messages = MessageCatalog::builtin();
    if !messages.set_fallback(&config.locale.fallback) {
        warn!(
            locale = %config.locale.fallback,
            "No messages for configured fallback locale, keeping default"
        );
    }
    messages
}

/// Builds the stage-dispatching calculator for `config`.
pub fn build_calculator(
    config: &PricingConfig,
    transport: Box<TransportFactory<'_>>,
) -> ClientResult<Calculator> {
    let source = build_price_source(config, transport)?;
    info!(source = source.name(), "Price source ready");

    let reconciler = PricingReconciler::with_messages(source, build_messages(config));
    Ok(StageDispatch::new(DefaultCalculator, reconciler))
}
