//! # Cart Annotations
//!
//! User-visible diagnostics attached to a cart or one of its lines, and the
//! list type that stores them.
//!
//! ## Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AnnotationList (insertion order preserved)                             │
//! │                                                                         │
//! │  [0] Pricing  / Error / Cart                     ◄─ service down        │
//! │  [1] Pricing  / Error / Item { id: 7f3c.., sku } ◄─ one SKU unpriced    │
//! │  [2] Shipping / Warn  / Cart                     ◄─ not ours, kept      │
//! │                                                                         │
//! │  remove_all_of_kind(Pricing)            → drops [0], [1]                │
//! │  remove_of_kind_related_to(Pricing, li) → drops [1] only                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Removal is expressed as a pure filter ([`AnnotationList::pruned`]); the
//! mutating helpers swap the filtered list back into place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LineItem, LineItemId};

// =============================================================================
// Kind & Severity
// =============================================================================

/// Which validation concern produced an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Pricing,
    Inventory,
    Shipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

// =============================================================================
// Scope
// =============================================================================

/// What an annotation is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AnnotationScope {
    /// Concerns the cart as a whole.
    Cart,
    /// Concerns one line. `line_item_id` is absent for lines that were not
    /// persisted when the annotation was raised.
    Item {
        line_item_id: Option<LineItemId>,
        sku: String,
    },
}

// =============================================================================
// Annotation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub severity: Severity,
    pub message: String,
    #[serde(flatten)]
    pub scope: AnnotationScope,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    /// Cart-scoped error.
    pub fn cart_error(kind: AnnotationKind, message: impl Into<String>) -> Self {
        Annotation {
            kind,
            severity: Severity::Error,
            message: message.into(),
            scope: AnnotationScope::Cart,
            created_at: Utc::now(),
        }
    }

    /// Error attached to a specific line.
    pub fn item_error(kind: AnnotationKind, item: &LineItem, message: impl Into<String>) -> Self {
        Annotation {
            kind,
            severity: Severity::Error,
            message: message.into(),
            scope: AnnotationScope::Item {
                line_item_id: item.id,
                sku: item.sku.clone(),
            },
            created_at: Utc::now(),
        }
    }

    pub fn is_cart_scoped(&self) -> bool {
        matches!(self.scope, AnnotationScope::Cart)
    }

    /// Returns the persisted line this annotation concerns, if any.
    pub fn line_item_id(&self) -> Option<LineItemId> {
        match &self.scope {
            AnnotationScope::Item { line_item_id, .. } => *line_item_id,
            AnnotationScope::Cart => None,
        }
    }

    pub fn is_related_to(&self, id: LineItemId) -> bool {
        self.line_item_id() == Some(id)
    }
}

// =============================================================================
// Annotation List
// =============================================================================

/// Ordered annotations attached to a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationList(Vec<Annotation>);

impl AnnotationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a list without the annotations matching `remove`, keeping the
    /// relative order of the survivors.
    pub fn pruned<F>(self, remove: F) -> AnnotationList
    where
        F: Fn(&Annotation) -> bool,
    {
        AnnotationList(self.0.into_iter().filter(|a| !remove(a)).collect())
    }

    /// Deletes every annotation of `kind`. Returns how many were removed.
    pub fn remove_all_of_kind(&mut self, kind: AnnotationKind) -> usize {
        self.prune_in_place(|a| a.kind == kind)
    }

    /// Deletes annotations of `kind` attached to `item`.
    ///
    /// A line without an id cannot have earlier annotations pointing at it,
    /// so this is a no-op for such lines. Cart-scoped annotations are never
    /// touched.
    pub fn remove_of_kind_related_to(&mut self, kind: AnnotationKind, item: &LineItem) -> usize {
        match item.id {
            Some(id) => self.prune_in_place(|a| a.kind == kind && a.is_related_to(id)),
            None => 0,
        }
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    fn prune_in_place<F>(&mut self, remove: F) -> usize
    where
        F: Fn(&Annotation) -> bool,
    {
        let before = self.0.len();
        *self = std::mem::take(self).pruned(remove);
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> {
        self.0.iter().filter(move |a| a.kind == kind)
    }

    pub fn related_to(&self, id: LineItemId) -> impl Iterator<Item = &Annotation> {
        self.0.iter().filter(move |a| a.is_related_to(id))
    }

    pub fn cart_scoped(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter().filter(|a| a.is_cart_scoped())
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.0
    }
}

impl From<Vec<Annotation>> for AnnotationList {
    fn from(annotations: Vec<Annotation>) -> Self {
        AnnotationList(annotations)
    }
}

impl<'a> IntoIterator for &'a AnnotationList {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
