//! # Domain Types
//!
//! Cart, line item and change-set types the pricing pass operates on.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌──────────────────┐  │
//! │  │      Cart       │   │      LineItem       │   │    ChangeSet     │  │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ──────────────  │  │
//! │  │  id (UUID)      │──►│  id (UUID, opt.)    │   │  records         │  │
//! │  │  stage          │   │  sku                │   │  checkout_started│  │
//! │  │  locale         │   │  quantity           │   └──────────────────┘  │
//! │  │  items          │   │  unit_list_price    │                         │
//! │  │  annotations    │   │  unit_sale_price    │   ┌──────────────────┐  │
//! │  └─────────────────┘   │  extended_*_price   │   │  ChangeRecord    │  │
//! │                        └─────────────────────┘   │  Changed(ItemRef)│  │
//! │                                                  │  Removed         │  │
//! │                                                  └──────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is owned by the caller's checkout pipeline. This crate only ever
//! sees it through `&mut Cart` for the duration of one pricing pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::annotation::AnnotationList;
use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Identity of a persisted line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    pub fn new() -> Self {
        LineItemId(Uuid::new_v4())
    }

    pub const fn from_uuid(id: Uuid) -> Self {
        LineItemId(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Cart Stage
// =============================================================================

/// Lifecycle marker of a cart.
///
/// ## Pricing Behavior per Stage
/// ```text
/// Active ─────► Checkout ─────► Submitted
///   │              │                │
///   ▼              ▼                ▼
/// default       external         external
/// calculator    price service    price service
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStage {
    /// Freely editable; buyer is still shopping.
    #[default]
    Active,
    /// Checkout has started.
    Checkout,
    /// Checkout has been committed (order submission in progress).
    Submitted,
}

impl CartStage {
    /// Returns true if the cart has not entered checkout yet.
    pub fn is_pre_checkout(&self) -> bool {
        matches!(self, CartStage::Active)
    }
}

impl fmt::Display for CartStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartStage::Active => write!(f, "active"),
            CartStage::Checkout => write!(f, "checkout"),
            CartStage::Submitted => write!(f, "submitted"),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line in the cart.
///
/// ## Price Fields
/// All four prices are `None` until the item is priced for the first time.
/// Whenever a price is assigned through [`LineItem::apply_price`], the
/// extended prices equal the unit prices times `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Absent for lines that have not been persisted yet.
    #[serde(default)]
    pub id: Option<LineItemId>,

    pub sku: String,

    pub quantity: i64,

    #[serde(default)]
    pub unit_list_price: Option<Money>,

    #[serde(default)]
    pub unit_sale_price: Option<Money>,

    #[serde(default)]
    pub extended_list_price: Option<Money>,

    #[serde(default)]
    pub extended_sale_price: Option<Money>,
}

impl LineItem {
    /// Creates an unpriced, not-yet-persisted line.
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            id: None,
            sku: sku.into(),
            quantity,
            unit_list_price: None,
            unit_sale_price: None,
            extended_list_price: None,
            extended_sale_price: None,
        }
    }

    /// Creates an unpriced line with a persisted identity.
    pub fn with_id(id: LineItemId, sku: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            id: Some(id),
            ..LineItem::new(sku, quantity)
        }
    }

    /// Assigns a resolved price to both list and sale fields.
    ///
    /// Returns false, leaving the line untouched, if the extended price
    /// does not fit in `Money`.
    #[must_use]
    pub fn apply_price(&mut self, unit_price: Money) -> bool {
        let Some(extended) = unit_price.multiply_quantity(self.quantity) else {
            return false;
        };
        self.unit_list_price = Some(unit_price);
        self.unit_sale_price = Some(unit_price);
        self.extended_list_price = Some(extended);
        self.extended_sale_price = Some(extended);
        true
    }

    /// Recomputes extended prices from the unit prices already on the line.
    ///
    /// An extended price that would overflow is cleared. Returns true if
    /// anything changed.
    pub fn refresh_extended(&mut self) -> bool {
        let list = self.unit_list_price.and_then(|p| p.multiply_quantity(self.quantity));
        let sale = self.unit_sale_price.and_then(|p| p.multiply_quantity(self.quantity));
        let changed = list != self.extended_list_price || sale != self.extended_sale_price;
        self.extended_list_price = list;
        self.extended_sale_price = sale;
        changed
    }

    pub fn is_priced(&self) -> bool {
        self.unit_sale_price.is_some()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Fallback locale used when a cart document does not carry one.
fn default_locale() -> String {
    "en".to_string()
}

/// The cart aggregate a pricing pass mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,

    #[serde(default)]
    pub stage: CartStage,

    /// Buyer's locale tag (`"en-US"`, `"fr"`, ...); selects message templates.
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub annotations: AnnotationList,
}

impl Cart {
    /// Creates an empty cart in the given stage.
    pub fn new(stage: CartStage) -> Self {
        Cart {
            id: Uuid::new_v4(),
            stage,
            locale: default_locale(),
            items: Vec::new(),
            annotations: AnnotationList::default(),
        }
    }

    /// Builder-style helper for setting the buyer locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Appends a line and returns a reference usable in a [`ChangeSet`].
    pub fn push_item(&mut self, item: LineItem) -> ItemRef {
        self.items.push(item);
        ItemRef(self.items.len() - 1)
    }

    /// Resolves an item reference against this cart.
    pub fn item(&self, item: ItemRef) -> Option<&LineItem> {
        self.items.get(item.0)
    }

    /// References to every line, in cart order.
    pub fn item_refs(&self) -> impl Iterator<Item = ItemRef> {
        (0..self.items.len()).map(ItemRef)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Change Set
// =============================================================================

/// Position of a line item within `Cart::items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRef(pub usize);

impl ItemRef {
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// One buyer edit since the previous pricing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", content = "item", rename_all = "snake_case")]
pub enum ChangeRecord {
    /// The referenced line was added or modified.
    Changed(ItemRef),
    /// A line was removed; there is nothing left to reprice.
    Removed,
}

/// Description of buyer edits since the last pricing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub records: Vec<ChangeRecord>,

    /// Set when this pass was triggered by the buyer starting checkout.
    #[serde(default)]
    pub checkout_started: bool,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changed(mut self, item: ItemRef) -> Self {
        self.records.push(ChangeRecord::Changed(item));
        self
    }

    pub fn removed(mut self) -> Self {
        self.records.push(ChangeRecord::Removed);
        self
    }

    pub fn with_checkout_started(mut self) -> Self {
        self.checkout_started = true;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
