//! # reprice-core: Pure Pricing Reconciliation Logic
//!
//! Recomputes line-item prices for a cart and reconciles the cart's PRICING
//! annotations with the outcome. Zero I/O: the remote price service plugs in
//! through the [`PriceSource`] trait from `reprice-client`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Reprice Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Checkout pipeline / reprice-cli (caller)             │   │
//! │  │      owns the Cart, supplies the ChangeSet and the stage        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &mut Cart                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ reprice-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌──────────┐ │   │
//! │  │   │ calculator │  │  resolver  │  │ annotation │  │  source  │ │   │
//! │  │   │  Dispatch  │─►│ targets +  │─►│   List     │  │  trait + │ │   │
//! │  │   │ Reconciler │  │ clearing   │  │  pruning   │  │  static  │ │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘  └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES                                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ PriceSource                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        reprice-client (remote price service, config)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Cart, LineItem, ChangeSet
//! - [`money`] - Integer-cents Money type
//! - [`annotation`] - Annotations and the list that stores them
//! - [`resolver`] - Which lines a pass reprices
//! - [`source`] - `PriceSource` trait and static table
//! - [`calculator`] - Stage dispatch, default calculator, reconciler
//! - [`locale`] - Localized annotation messages
//! - [`validation`] - Input checks for cart documents
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use reprice_core::{
//!     CartCalculator, Cart, CartStage, DefaultCalculator, LineItem, Money,
//!     PricingReconciler, StageDispatch, StaticPriceSource,
//! };
//!
//! let calculator = StageDispatch::new(
//!     DefaultCalculator,
//!     PricingReconciler::new(StaticPriceSource::default()),
//! );
//!
//! let mut cart = Cart::new(CartStage::Checkout);
//! cart.push_item(LineItem::new("My SKU 1", 2));
//!
//! calculator.calculate(&mut cart, None);
//! assert_eq!(cart.items[0].extended_sale_price, Some(Money::from_cents(20000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod annotation;
pub mod calculator;
pub mod error;
pub mod locale;
pub mod money;
pub mod resolver;
pub mod source;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use annotation::{Annotation, AnnotationKind, AnnotationList, AnnotationScope, Severity};
pub use calculator::{
    route, CartCalculator, DefaultCalculator, PricingReconciler, ReconcileReport, Route,
    StageDispatch,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use locale::{LocaleMessages, MessageCatalog};
pub use money::Money;
pub use resolver::{resolve, PassScope, Resolution};
pub use source::{PriceLookup, PriceSource, StaticPriceSource, StaticTableConfig};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines accepted in one cart document.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum SKU length in characters.
pub const MAX_SKU_LENGTH: usize = 64;

/// Maximum unit price in cents ($1,000,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;
