//! # Error Types
//!
//! Domain-specific error types for reprice-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  reprice-core errors (this file)                                        │
//! │  ├── CoreError        - Cart-level rule violations                      │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  reprice-client errors (separate crate)                                 │
//! │  └── ClientError      - Config loading, transport plumbing              │
//! │                                                                         │
//! │  NOT errors: pricing failures. A missing price or an unreachable        │
//! │  price service becomes an Annotation on the cart, never an Err.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart-level business rule violations.
///
/// Raised by [`crate::validation::validate_cart`] before a pricing pass, so
/// the reconciler itself can assume a well-formed cart.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item failed validation.
    ///
    /// ## When This Occurs
    /// - Cart document carries an empty SKU
    /// - Quantity is zero or negative
    #[error("Line item {index} is invalid: {source}")]
    InvalidLineItem {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A change record points past the end of the cart.
    #[error("Change record refers to line {index}, cart has {len} lines")]
    DanglingChange { index: usize, len: usize },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a price that is not a decimal number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
