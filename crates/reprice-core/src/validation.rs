//! # Validation Module
//!
//! Input validation for cart documents entering a pricing pass.
//!
//! The reconciler assumes quantities are positive and SKUs non-empty; the
//! caller checks that here before handing a cart over.
//!
//! ## Usage
//! ```rust
//! use reprice_core::validation::{validate_quantity, validate_sku};
//!
//! assert!(validate_sku("My SKU 1").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Cart, ChangeRecord, ChangeSet};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_SKU_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most `MAX_SKU_LENGTH` characters
///
/// Spaces inside a SKU are allowed; the price service keys on the exact
/// string ("My SKU 1").
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    if sku.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Rules
/// - Zero is allowed (free items)
/// - Must not be negative or exceed MAX_PRICE_CENTS
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates every line of a cart.
pub fn validate_cart(cart: &Cart) -> CoreResult<()> {
    if cart.items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    for (index, item) in cart.items.iter().enumerate() {
        validate_sku(&item.sku)
            .and_then(|_| validate_quantity(item.quantity))
            .and_then(|_| {
                [item.unit_list_price, item.unit_sale_price]
                    .into_iter()
                    .flatten()
                    .try_for_each(|price| validate_price_cents(price.cents()))
            })
            .map_err(|source| CoreError::InvalidLineItem { index, source })?;
    }

    Ok(())
}

/// Checks that every `Changed` record points at a line of `cart`.
///
/// The resolver tolerates dangling references (it skips them); this is for
/// callers that would rather reject the request.
pub fn validate_change_set(cart: &Cart, changes: &ChangeSet) -> CoreResult<()> {
    for record in &changes.records {
        if let ChangeRecord::Changed(item) = record {
            if item.index() >= cart.items.len() {
                return Err(CoreError::DanglingChange {
                    index: item.index(),
                    len: cart.items.len(),
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
