//! # Change-Set Resolution
//!
//! Decides which lines a pricing pass must reprice and clears the stale
//! PRICING annotations for exactly those lines.
//!
//! ## Decision Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stage is pre-checkout? ──yes──► no targets, nothing cleared            │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │  no change set, or checkout_started? ──yes──► FULL pass                 │
//! │          │ no                                 clear all PRICING         │
//! │          ▼                                    target every line         │
//! │  TARGETED pass                                                          │
//! │    for record in change set (in order):                                 │
//! │      Changed(i) → target i, clear PRICING annotations of line i         │
//! │      Removed    → skip                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::annotation::AnnotationKind;
use crate::types::{Cart, ChangeRecord, ChangeSet, ItemRef};

/// How a pass was scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassScope {
    /// Pre-checkout; this resolver does not apply.
    Bypassed,
    /// Every line is repriced.
    Full,
    /// Only lines named by the change set are repriced.
    Targeted,
}

/// Lines selected for repricing, in the order they must be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub scope: PassScope,
    pub targets: Vec<ItemRef>,
    /// PRICING annotations removed while resolving.
    pub cleared: usize,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Resolves the targets of a pass and clears their stale PRICING annotations.
pub fn resolve(cart: &mut Cart, changes: Option<&ChangeSet>) -> Resolution {
    if cart.stage.is_pre_checkout() {
        return Resolution {
            scope: PassScope::Bypassed,
            targets: Vec::new(),
            cleared: 0,
        };
    }

    match changes {
        Some(changes) if !changes.checkout_started => resolve_targeted(cart, changes),
        _ => resolve_full(cart),
    }
}

fn resolve_full(cart: &mut Cart) -> Resolution {
    let cleared = cart.annotations.remove_all_of_kind(AnnotationKind::Pricing);
    let targets: Vec<ItemRef> = cart.item_refs().collect();
    debug!(cart_id = %cart.id, lines = targets.len(), cleared, "Full pricing pass");

    Resolution {
        scope: PassScope::Full,
        targets,
        cleared,
    }
}

fn resolve_targeted(cart: &mut Cart, changes: &ChangeSet) -> Resolution {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    let mut cleared = 0;

    for record in &changes.records {
        let item_ref = match record {
            ChangeRecord::Changed(item_ref) => *item_ref,
            ChangeRecord::Removed => continue,
        };

        let Some(item) = cart.items.get(item_ref.index()) else {
            warn!(
                cart_id = %cart.id,
                index = item_ref.index(),
                lines = cart.items.len(),
                "Change record points past the end of the cart, skipping"
            );
            continue;
        };

        if !seen.insert(item_ref) {
            continue;
        }

        cleared += cart
            .annotations
            .remove_of_kind_related_to(AnnotationKind::Pricing, item);
        targets.push(item_ref);
    }

    debug!(
        cart_id = %cart.id,
        records = changes.records.len(),
        lines = targets.len(),
        cleared,
        "Targeted pricing pass"
    );

    Resolution {
        scope: PassScope::Targeted,
        targets,
        cleared,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::types::{CartStage, LineItem, LineItemId};

    fn checkout_cart() -> Cart {
        let mut cart = Cart::new(CartStage::Checkout);
        cart.push_item(LineItem::with_id(LineItemId::new(), "A", 1));
        cart.push_item(LineItem::with_id(LineItemId::new(), "B", 1));
        cart.push_item(LineItem::with_id(LineItemId::new(), "C", 1));
        cart
    }

    fn annotate_every_line(cart: &mut Cart) {
        let annotations: Vec<Annotation> = cart
            .items
            .iter()
            .map(|item| Annotation::item_error(AnnotationKind::Pricing, item, item.sku.clone()))
            .collect();
        for annotation in annotations {
            cart.annotations.push(annotation);
        }
    }

    fn messages(cart: &Cart) -> Vec<&str> {
        cart.annotations.iter().map(|a| a.message.as_str()).collect()
    }

    #[test]
    fn test_pre_checkout_is_bypassed() {
        let mut cart = checkout_cart();
        cart.stage = CartStage::Active;
        annotate_every_line(&mut cart);

        let resolution = resolve(&mut cart, None);

        assert_eq!(resolution.scope, PassScope::Bypassed);
        assert!(resolution.is_empty());
        assert_eq!(cart.annotations.len(), 3);
    }

    #[test]
    fn test_no_change_set_is_full_pass() {
        let mut cart = checkout_cart();
        annotate_every_line(&mut cart);
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Pricing, "cart"));
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Shipping, "ship"));

        let resolution = resolve(&mut cart, None);

        assert_eq!(resolution.scope, PassScope::Full);
        assert_eq!(resolution.targets, vec![ItemRef(0), ItemRef(1), ItemRef(2)]);
        assert_eq!(resolution.cleared, 4);
        assert_eq!(messages(&cart), vec!["ship"]);
    }

    #[test]
    fn test_checkout_started_forces_full_pass() {
        let mut cart = checkout_cart();
        annotate_every_line(&mut cart);
        let changes = ChangeSet::new().changed(ItemRef(1)).with_checkout_started();

        let resolution = resolve(&mut cart, Some(&changes));

        assert_eq!(resolution.scope, PassScope::Full);
        assert_eq!(resolution.targets.len(), 3);
        assert!(cart.annotations.is_empty());
    }

    #[test]
    fn test_targeted_pass_follows_record_order() {
        let mut cart = checkout_cart();
        annotate_every_line(&mut cart);
        let changes = ChangeSet::new().changed(ItemRef(2)).changed(ItemRef(0));

        let resolution = resolve(&mut cart, Some(&changes));

        assert_eq!(resolution.scope, PassScope::Targeted);
        assert_eq!(resolution.targets, vec![ItemRef(2), ItemRef(0)]);
        assert_eq!(resolution.cleared, 2);
        assert_eq!(messages(&cart), vec!["B"]);
    }

    #[test]
    fn test_targeted_pass_keeps_cart_scoped_annotations() {
        let mut cart = checkout_cart();
        cart.annotations
            .push(Annotation::cart_error(AnnotationKind::Pricing, "cart"));
        let changes = ChangeSet::new().changed(ItemRef(0));

        resolve(&mut cart, Some(&changes));

        assert_eq!(messages(&cart), vec!["cart"]);
    }

    #[test]
    fn test_removed_records_contribute_nothing() {
        let mut cart = checkout_cart();
        annotate_every_line(&mut cart);
        let changes = ChangeSet::new().removed();

        let resolution = resolve(&mut cart, Some(&changes));

        assert_eq!(resolution.scope, PassScope::Targeted);
        assert!(resolution.is_empty());
        assert_eq!(cart.annotations.len(), 3);
    }

    #[test]
    fn test_empty_change_set_targets_nothing() {
        let mut cart = checkout_cart();
        let resolution = resolve(&mut cart, Some(&ChangeSet::new()));
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_dangling_and_repeated_references() {
        let mut cart = checkout_cart();
        let changes = ChangeSet::new()
            .changed(ItemRef(1))
            .changed(ItemRef(9))
            .changed(ItemRef(1));

        let resolution = resolve(&mut cart, Some(&changes));

        assert_eq!(resolution.targets, vec![ItemRef(1)]);
    }
}
