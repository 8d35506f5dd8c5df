//! # Cart Calculators
//!
//! The pricing pass itself: stage dispatch, the cheap default calculator and
//! the checkout-stage reconciler.
//!
//! ## Pass Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StageDispatch::calculate(cart, changes)                                │
//! │       │                                                                 │
//! │       ├── Active ──────────► DefaultCalculator (refresh extended)       │
//! │       │                                                                 │
//! │       └── Checkout/Submitted ► PricingReconciler                        │
//! │                                   │                                     │
//! │                                   ├─ resolver::resolve  (targets,       │
//! │                                   │                      clear stale)   │
//! │                                   ├─ PriceSource::lookup(distinct SKUs) │
//! │                                   │                                     │
//! │                                   ├─ Unavailable → 1 cart annotation    │
//! │                                   └─ Priced      → price each target,   │
//! │                                                    annotate misses      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing failures never surface as `Err`. The caller learns about them only
//! through the cart's annotation list.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::annotation::{Annotation, AnnotationKind};
use crate::locale::MessageCatalog;
use crate::resolver::{self, PassScope};
use crate::source::{PriceLookup, PriceSource};
use crate::types::{Cart, CartStage, ChangeSet, ItemRef};

// =============================================================================
// Calculator Trait
// =============================================================================

/// Anything that can run a pricing pass over a cart.
pub trait CartCalculator {
    fn calculate(&self, cart: &mut Cart, changes: Option<&ChangeSet>) -> ReconcileReport;
}

/// Summary of one pass, for logs and callers that want counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Lines the pass set out to price.
    pub targets: usize,
    /// Lines that received a price.
    pub priced: usize,
    /// Lines annotated as unpriced.
    pub unpriced: usize,
    /// The price source could not price the batch.
    pub source_unavailable: bool,
    /// Stale PRICING annotations removed before pricing.
    pub cleared: usize,
}

// =============================================================================
// Stage Dispatch
// =============================================================================

/// Which calculator serves a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Default,
    Reconcile,
}

/// Picks the calculator for a cart stage.
pub fn route(stage: CartStage) -> Route {
    if stage.is_pre_checkout() {
        Route::Default
    } else {
        Route::Reconcile
    }
}

/// Sends pre-checkout carts to `default` and everything else to `reconciler`.
#[derive(Debug, Clone)]
pub struct StageDispatch<D, R> {
    default: D,
    reconciler: R,
}

impl<D, R> StageDispatch<D, R>
where
    D: CartCalculator,
    R: CartCalculator,
{
    pub fn new(default: D, reconciler: R) -> Self {
        StageDispatch {
            default,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &R {
        &self.reconciler
    }
}

impl<D, R> CartCalculator for StageDispatch<D, R>
where
    D: CartCalculator,
    R: CartCalculator,
{
    fn calculate(&self, cart: &mut Cart, changes: Option<&ChangeSet>) -> ReconcileReport {
        match route(cart.stage) {
            Route::Default => self.default.calculate(cart, changes),
            Route::Reconcile => self.reconciler.calculate(cart, changes),
        }
    }
}

// =============================================================================
// Default Calculator
// =============================================================================

/// Pre-checkout calculator: keeps extended prices in line with quantities
/// using the unit prices already on each line. No lookups, no annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCalculator;

impl CartCalculator for DefaultCalculator {
    fn calculate(&self, cart: &mut Cart, _changes: Option<&ChangeSet>) -> ReconcileReport {
        let refreshed = cart
            .items
            .iter_mut()
            .map(|item| item.refresh_extended())
            .filter(|changed| *changed)
            .count();
        debug!(cart_id = %cart.id, refreshed, "Default pricing pass");

        ReconcileReport {
            targets: cart.items.len(),
            priced: cart.items.iter().filter(|item| item.is_priced()).count(),
            ..ReconcileReport::default()
        }
    }
}

// =============================================================================
// Pricing Reconciler
// =============================================================================

/// Checkout-stage calculator backed by a [`PriceSource`].
#[derive(Debug, Clone)]
pub struct PricingReconciler<S> {
    source: S,
    messages: MessageCatalog,
}

impl<S: PriceSource> PricingReconciler<S> {
    pub fn new(source: S) -> Self {
        Self::with_messages(source, MessageCatalog::builtin())
    }

    pub fn with_messages(source: S, messages: MessageCatalog) -> Self {
        PricingReconciler { source, messages }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// Runs the checkout pricing pass.
    ///
    /// Pre-checkout carts are left untouched; wrap the reconciler in a
    /// [`StageDispatch`] to route them to a default calculator instead.
    pub fn reconcile(&self, cart: &mut Cart, changes: Option<&ChangeSet>) -> ReconcileReport {
        let resolution = resolver::resolve(cart, changes);
        if resolution.scope == PassScope::Bypassed {
            return ReconcileReport::default();
        }

        let mut report = ReconcileReport {
            targets: resolution.targets.len(),
            cleared: resolution.cleared,
            ..ReconcileReport::default()
        };
        if resolution.is_empty() {
            debug!(cart_id = %cart.id, "No lines to reprice");
            return report;
        }

        let skus = distinct_skus(cart, &resolution.targets);
        let lookup = self.source.lookup(&skus);

        let prices = match lookup {
            PriceLookup::Unavailable => {
                warn!(
                    cart_id = %cart.id,
                    source = self.source.name(),
                    skus = skus.len(),
                    "Price source unavailable, cart left unpriced"
                );
                let message = self.messages.pricing_unavailable(&cart.locale);
                cart.annotations
                    .push(Annotation::cart_error(AnnotationKind::Pricing, message));
                report.source_unavailable = true;
                return report;
            }
            PriceLookup::Priced(prices) => prices,
        };

        for target in &resolution.targets {
            let Some(item) = cart.items.get_mut(target.index()) else {
                continue;
            };

            let applied = match prices.get(&item.sku) {
                Some(price) => {
                    let applied = item.apply_price(*price);
                    if !applied {
                        warn!(
                            cart_id = %cart.id,
                            sku = %item.sku,
                            price = %price,
                            quantity = item.quantity,
                            "Extended price out of range, line left unpriced"
                        );
                    }
                    applied
                }
                None => {
                    warn!(cart_id = %cart.id, sku = %item.sku, "No price for SKU");
                    false
                }
            };

            if applied {
                report.priced += 1;
            } else {
                let message = self.messages.item_price_unavailable(&cart.locale, &item.sku);
                let annotation = Annotation::item_error(AnnotationKind::Pricing, item, message);
                cart.annotations.push(annotation);
                report.unpriced += 1;
            }
        }

        info!(
            cart_id = %cart.id,
            source = self.source.name(),
            targets = report.targets,
            priced = report.priced,
            unpriced = report.unpriced,
            "Pricing pass complete"
        );
        report
    }
}

impl<S: PriceSource> CartCalculator for PricingReconciler<S> {
    fn calculate(&self, cart: &mut Cart, changes: Option<&ChangeSet>) -> ReconcileReport {
        self.reconcile(cart, changes)
    }
}

/// SKUs of the target lines. Lines sharing a SKU share one lookup entry.
fn distinct_skus(cart: &Cart, targets: &[ItemRef]) -> BTreeSet<String> {
    targets
        .iter()
        .filter_map(|target| cart.item(*target).map(|item| item.sku.clone()))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationScope;
    use crate::money::Money;
    use crate::source::{StaticPriceSource, StaticTableConfig};
    use crate::types::{LineItem, LineItemId};
    use std::sync::Mutex;

    /// Records every batch it is asked for and answers from a fixed outcome.
    struct RecordingSource {
        outcome: PriceLookup,
        calls: Mutex<Vec<BTreeSet<String>>>,
    }

    impl RecordingSource {
        fn answering(outcome: PriceLookup) -> Self {
            RecordingSource {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<BTreeSet<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PriceSource for RecordingSource {
        fn lookup(&self, skus: &BTreeSet<String>) -> PriceLookup {
            self.calls.lock().unwrap().push(skus.clone());
            self.outcome.clone()
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn priced(entries: &[(&str, i64)]) -> PriceLookup {
        PriceLookup::Priced(
            entries
                .iter()
                .map(|(sku, cents)| (sku.to_string(), Money::from_cents(*cents)))
                .collect(),
        )
    }

    fn scenario_cart() -> Cart {
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::with_id(LineItemId::new(), "My SKU 1", 2));
        cart.push_item(LineItem::with_id(LineItemId::new(), "My SKU 2", 1));
        cart
    }

    fn assert_extended_exact(cart: &Cart) {
        for item in cart.items.iter().filter(|i| i.is_priced()) {
            let unit = item.unit_sale_price.unwrap();
            assert_eq!(item.extended_sale_price, unit.multiply_quantity(item.quantity));
            let list = item.unit_list_price.unwrap();
            assert_eq!(item.extended_list_price, list.multiply_quantity(item.quantity));
        }
    }

    #[test]
    fn test_full_pass_with_static_table() {
        let reconciler = PricingReconciler::new(StaticPriceSource::default());
        let mut cart = scenario_cart();

        let report = reconciler.calculate(&mut cart, None);

        assert_eq!(cart.items[0].unit_list_price, Some(Money::from_cents(10000)));
        assert_eq!(cart.items[0].unit_sale_price, Some(Money::from_cents(10000)));
        assert_eq!(cart.items[0].extended_sale_price, Some(Money::from_cents(20000)));
        assert_eq!(cart.items[1].unit_sale_price, Some(Money::from_cents(20000)));
        assert_eq!(cart.items[1].extended_list_price, Some(Money::from_cents(20000)));
        assert!(cart.annotations.is_empty());
        assert_eq!(report.priced, 2);
        assert_extended_exact(&cart);
    }

    #[test]
    fn test_unknown_sku_gets_item_annotation() {
        let source = StaticPriceSource::new(&StaticTableConfig::default());
        let reconciler = PricingReconciler::new(source);
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::with_id(LineItemId::new(), "Unknown SKU", 2));
        let before = cart.items[0].clone();

        let report = reconciler.calculate(&mut cart, None);

        assert_eq!(cart.items[0], before);
        assert_eq!(cart.annotations.len(), 1);
        let annotation = &cart.annotations.as_slice()[0];
        assert!(annotation.message.contains("Unknown SKU"));
        assert_eq!(annotation.line_item_id(), before.id);
        assert_eq!(report.unpriced, 1);
    }

    #[test]
    fn test_unknown_sku_priced_by_default_when_enabled() {
        let config = StaticTableConfig {
            price_missing_skus_by_default: true,
            default_price_cents: 500,
            ..StaticTableConfig::default()
        };
        let reconciler = PricingReconciler::new(StaticPriceSource::new(&config));
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::new("Unknown SKU", 3));

        reconciler.calculate(&mut cart, None);

        assert_eq!(cart.items[0].extended_sale_price, Some(Money::from_cents(1500)));
        assert!(cart.annotations.is_empty());
    }

    #[test]
    fn test_removed_only_change_set_skips_lookup() {
        let source = RecordingSource::answering(priced(&[("My SKU 1", 1)]));
        let reconciler = PricingReconciler::new(source);
        let mut cart = scenario_cart();
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Pricing, "old"));
        let before = cart.clone();

        let report = reconciler.calculate(&mut cart, Some(&ChangeSet::new().removed()));

        assert!(reconciler.source().calls().is_empty());
        assert_eq!(cart, before);
        assert_eq!(report.targets, 0);
    }

    #[test]
    fn test_empty_checkout_cart_clears_without_lookup() {
        let source = RecordingSource::answering(priced(&[("My SKU 1", 1)]));
        let reconciler = PricingReconciler::new(source);
        let mut cart = Cart::new(CartStage::Checkout);
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Pricing, "stale"));
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Shipping, "ship"));

        let report = reconciler.calculate(&mut cart, None);

        assert!(reconciler.source().calls().is_empty());
        assert_eq!(report.targets, 0);
        assert_eq!(report.cleared, 1);
        assert_eq!(cart.annotations.of_kind(AnnotationKind::Pricing).count(), 0);
        assert_eq!(cart.annotations.len(), 1);
    }

    #[test]
    fn test_overflowing_extended_price_leaves_line_unpriced() {
        let source = RecordingSource::answering(priced(&[
            ("A", 5_000_000_000_000_000_000),
            ("B", 250),
        ]));
        let reconciler = PricingReconciler::new(source);
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::with_id(LineItemId::new(), "A", 2));
        cart.push_item(LineItem::with_id(LineItemId::new(), "B", 2));

        let report = reconciler.calculate(&mut cart, None);

        assert_eq!(report.priced, 1);
        assert_eq!(report.unpriced, 1);
        assert!(!cart.items[0].is_priced());
        assert_eq!(cart.items[0].extended_sale_price, None);
        assert_eq!(cart.items[1].extended_sale_price, Some(Money::from_cents(500)));

        let annotations: Vec<_> = cart.annotations.iter().collect();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].line_item_id(), cart.items[0].id);
        assert_extended_exact(&cart);
    }

    #[test]
    fn test_whole_batch_failure_adds_one_cart_annotation() {
        let reconciler = PricingReconciler::new(RecordingSource::answering(PriceLookup::Unavailable));
        let mut cart = scenario_cart();
        assert!(cart.items[0].apply_price(Money::from_cents(1)));
        let before_items = cart.items.clone();

        let report = reconciler.calculate(&mut cart, None);

        assert_eq!(cart.items, before_items);
        assert_eq!(cart.annotations.len(), 1);
        assert!(cart.annotations.as_slice()[0].is_cart_scoped());
        assert!(cart.annotations.as_slice()[0].message.starts_with("We were unable"));
        assert!(report.source_unavailable);
    }

    #[test]
    fn test_failure_message_follows_cart_locale() {
        let reconciler = PricingReconciler::new(RecordingSource::answering(PriceLookup::Unavailable));
        let mut cart = scenario_cart().with_locale("fr-CA");

        reconciler.calculate(&mut cart, None);

        assert!(cart.annotations.as_slice()[0].message.starts_with("Nous"));
    }

    #[test]
    fn test_partial_failure_is_isolated() {
        let reconciler = PricingReconciler::new(RecordingSource::answering(priced(&[("A", 250)])));
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::with_id(LineItemId::new(), "A", 4));
        cart.push_item(LineItem::with_id(LineItemId::new(), "B", 1));
        cart.push_item(LineItem::with_id(LineItemId::new(), "A", 1));

        let report = reconciler.calculate(&mut cart, None);

        assert_eq!(cart.items[0].extended_sale_price, Some(Money::from_cents(1000)));
        assert_eq!(cart.items[2].extended_sale_price, Some(Money::from_cents(250)));
        assert!(!cart.items[1].is_priced());
        assert_eq!(cart.annotations.len(), 1);
        match &cart.annotations.as_slice()[0].scope {
            AnnotationScope::Item { sku, line_item_id } => {
                assert_eq!(sku, "B");
                assert_eq!(*line_item_id, cart.items[1].id);
            }
            AnnotationScope::Cart => panic!("expected item-scoped annotation"),
        }
        assert_eq!((report.priced, report.unpriced), (2, 1));
        assert_extended_exact(&cart);
    }

    #[test]
    fn test_shared_sku_is_looked_up_once() {
        let reconciler = PricingReconciler::new(RecordingSource::answering(priced(&[("A", 100)])));
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::new("A", 1));
        cart.push_item(LineItem::new("A", 2));

        reconciler.calculate(&mut cart, None);

        let calls = reconciler.source().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert!(cart.items.iter().all(|i| i.is_priced()));
    }

    #[test]
    fn test_full_pass_is_idempotent() {
        let reconciler = PricingReconciler::new(StaticPriceSource::default());
        let mut cart = scenario_cart();
        cart.push_item(LineItem::with_id(LineItemId::new(), "Unknown SKU", 1));

        reconciler.calculate(&mut cart, None);
        let first = cart.clone();
        reconciler.calculate(&mut cart, None);

        assert_eq!(cart.items, first.items);
        assert_eq!(
            cart.annotations.of_kind(AnnotationKind::Pricing).count(),
            first.annotations.of_kind(AnnotationKind::Pricing).count()
        );
        assert_eq!(cart.annotations.len(), 1);
    }

    #[test]
    fn test_targeted_pass_reprices_only_changed_lines() {
        let source = RecordingSource::answering(priced(&[("My SKU 2", 300)]));
        let reconciler = PricingReconciler::new(source);
        let mut cart = scenario_cart();
        assert!(cart.items[0].apply_price(Money::from_cents(999)));
        let untouched = cart.items[0].clone();
        let stale_other = Annotation::item_error(AnnotationKind::Pricing, &cart.items[0], "old-1");
        let stale_changed = Annotation::item_error(AnnotationKind::Pricing, &cart.items[1], "old-2");
        cart.annotations.push(stale_other);
        cart.annotations.push(stale_changed);

        let report = reconciler.calculate(&mut cart, Some(&ChangeSet::new().changed(ItemRef(1))));

        let calls = reconciler.source().calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("My SKU 2"));
        assert!(!calls[0].contains("My SKU 1"));
        assert_eq!(cart.items[0], untouched);
        assert_eq!(cart.items[1].unit_sale_price, Some(Money::from_cents(300)));
        let remaining: Vec<&str> = cart.annotations.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(remaining, vec!["old-1"]);
        assert_eq!(report.cleared, 1);
    }

    #[test]
    fn test_reconciler_ignores_pre_checkout_cart() {
        let reconciler = PricingReconciler::new(RecordingSource::answering(PriceLookup::Unavailable));
        let mut cart = scenario_cart();
        cart.stage = CartStage::Active;
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Pricing, "keep"));
        let before = cart.clone();

        reconciler.calculate(&mut cart, None);

        assert_eq!(cart, before);
        assert!(reconciler.source().calls().is_empty());
    }

    #[test]
    fn test_route() {
        assert_eq!(route(CartStage::Active), Route::Default);
        assert_eq!(route(CartStage::Checkout), Route::Reconcile);
        assert_eq!(route(CartStage::Submitted), Route::Reconcile);
    }

    #[test]
    fn test_dispatch_sends_active_cart_to_default() {
        let dispatch = StageDispatch::new(
            DefaultCalculator,
            PricingReconciler::new(RecordingSource::answering(PriceLookup::Unavailable)),
        );
        let mut cart = scenario_cart();
        cart.stage = CartStage::Active;
        assert!(cart.items[0].apply_price(Money::from_cents(100)));
        cart.items[0].quantity = 5;
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Pricing, "keep"));

        dispatch.calculate(&mut cart, None);

        assert!(dispatch.reconciler().source().calls().is_empty());
        assert_eq!(cart.items[0].extended_sale_price, Some(Money::from_cents(500)));
        assert!(!cart.items[1].is_priced());
        assert_eq!(cart.annotations.len(), 1);
    }

    #[test]
    fn test_dispatch_sends_checkout_cart_to_reconciler() {
        let dispatch = StageDispatch::new(
            DefaultCalculator,
            PricingReconciler::new(StaticPriceSource::default()),
        );
        let mut cart = scenario_cart();
        cart.stage = CartStage::Submitted;

        let report = dispatch.calculate(&mut cart, None);

        assert_eq!(report.priced, 2);
        assert_eq!(cart.items[1].unit_sale_price, Some(Money::from_cents(20000)));
    }
}
