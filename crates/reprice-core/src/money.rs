//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Extended price = unit price × quantity must hold EXACTLY, so every    │
//! │  price in a cart is stored as integer cents.                            │
//! │                                                                         │
//! │  The price service speaks decimals ("19.99"), which are parsed         │
//! │  straight into cents without ever passing through f64 arithmetic.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use reprice_core::money::Money;
//!
//! let unit = Money::from_cents(10000);      // $100.00
//! let extended = unit.multiply_quantity(2); // $200.00
//! assert_eq!(extended, Some(Money::from_cents(20000)));
//!
//! let parsed: Money = "19.99".parse().unwrap();
//! assert_eq!(parsed.cents(), 1999);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// PriceSource ──► PriceLookup(sku → Money) ──► LineItem.unit_*_price
///                                                   │
///                                                   ▼ × quantity
///                                          LineItem.extended_*_price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Resolved price: $100.00
    /// Quantity: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Extended price: $200.00
    /// ```
    ///
    /// Returns `None` if the product does not fit in an `i64` of cents.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Parses a decimal amount such as `"100"`, `"19.99"` or `"-5.5"`.
    ///
    /// Fractions beyond two digits are rounded half away from zero.
    /// Exponent notation, thousands separators and currency symbols are
    /// rejected.
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("empty amount"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a plain decimal number"));
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount out of range"))?
        };

        let digits: Vec<u32> = fraction.chars().filter_map(|c| c.to_digit(10)).collect();
        let tenths = digits.first().copied().unwrap_or(0) as i64;
        let hundredths = digits.get(1).copied().unwrap_or(0) as i64;
        let round_up = digits.get(2).is_some_and(|d| *d >= 5);

        let mut cents = whole_units
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths))
            .ok_or_else(|| invalid("amount out of range"))?;
        if round_up {
            cents = cents
                .checked_add(1)
                .ok_or_else(|| invalid("amount out of range"))?;
        }

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering; locale-aware formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_decimal(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
