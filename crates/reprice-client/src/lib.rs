//! # reprice-client: Remote Pricing & Configuration
//!
//! Everything in the pricing flow that talks to the outside world: the
//! remote price service, config files and the environment.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   PricingConfig::load ──► service::build_calculator                     │
//! │   (toml + env)                  │                                       │
//! │                                 ├── SourceMode::Static                  │
//! │                                 │      └─ reprice_core::StaticPriceSource│
//! │                                 │                                       │
//! │                                 └── SourceMode::Remote                  │
//! │                                        └─ RemotePriceSource             │
//! │                                             └─ dyn HttpTransport        │
//! │                                                (injected by the app)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - Pricing configuration (source mode, table, remote endpoint)
//! - [`error`] - Client error types
//! - [`remote`] - Remote price source and the `HttpTransport` seam
//! - [`service`] - Calculator assembly from config

pub mod config;
pub mod error;
pub mod remote;
pub mod service;

pub use config::{LocaleSettings, PricingConfig, RemoteSettings, SourceMode};
pub use error::{ClientError, ClientResult};
pub use remote::{decode_prices, HttpResponse, HttpTransport, RemotePriceSource};
pub use service::{build_calculator, build_messages, build_price_source, Calculator, TransportFactory};
