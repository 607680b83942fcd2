//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A storefront that keeps prices as floats drifts:                       │
//! │    24.99 × (1 - 15/100) = 21.241499999999998                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    2499 cents, 15% off = 2499 - 375 = 2124 cents ($21.24)               │
//! │    The rounding step is explicit and happens once per unit price        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bookshelf_core::money::Money;
//! use bookshelf_core::types::Discount;
//!
//! let price = Money::from_major_minor(24, 99);          // $24.99
//! let sale = price.apply_discount(Discount::from_percentage(15.0));
//! assert_eq!(sale.cents(), 2124);                       // $21.24
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::types::Discount;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// CatalogItem.price ──► CartLine snapshot ──► discounted unit price
///                                                   │
///                                            × quantity
///                                                   │
///                                   Cart total ──► PaymentRequest.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bookshelf_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1999).cents(), 1999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// Saturates instead of overflowing; a cart never gets near `i64::MAX`
    /// cents but quantities come straight from user gestures.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Returns the price after taking a percentage discount off.
    ///
    /// The discount amount is rounded half-up to the nearest cent and then
    /// subtracted, so `$24.99` at 15% is `$24.99 - $3.75 = $21.24`.
    /// A zero discount returns the price unchanged.
    ///
    /// ```rust
    /// use bookshelf_core::money::Money;
    /// use bookshelf_core::types::Discount;
    ///
    /// let price = Money::from_cents(10000);
    /// assert_eq!(price.apply_discount(Discount::from_percentage(20.0)).cents(), 8000);
    /// assert_eq!(price.apply_discount(Discount::zero()), price);
    /// ```
    pub fn apply_discount(&self, discount: Discount) -> Money {
        if discount.is_zero() {
            return *self;
        }
        // i128 keeps price × bps from overflowing on absurd prices
        let amount = (self.0 as i128 * discount.bps() as i128 + 5000) / 10000;
        Money(self.0 - amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly dollar rendering. Currency-aware formatting lives on
/// [`crate::types::Currency::format`].
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

// Arithmetic saturates like `multiply_quantity`, so a line pinned at the
// maximum can still be summed into a cart total.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Cart totals are folds over line totals.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(24, 99).cents(), 2499);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(2124)), "$21.24");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let prices = [Money::from_cents(2124), Money::from_cents(2399)];
        let total: Money = prices.iter().sum();
        assert_eq!(total.cents(), 4523);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_apply_discount_rounds_half_up() {
        // $24.99 × 15% = $3.7485 → $3.75 off
        let price = Money::from_cents(2499);
        assert_eq!(price.apply_discount(Discount::from_percentage(15.0)).cents(), 2124);

        // $29.99 × 20% = $5.998 → $6.00 off
        let price = Money::from_cents(2999);
        assert_eq!(price.apply_discount(Discount::from_percentage(20.0)).cents(), 2399);
    }

    #[test]
    fn test_apply_full_discount_is_free() {
        let price = Money::from_cents(1999);
        assert!(price.apply_discount(Discount::from_percentage(100.0)).is_zero());
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let price = Money::from_cents(i64::MAX / 2);
        assert_eq!(price.multiply_quantity(4).cents(), i64::MAX);
    }

    #[test]
    fn test_add_and_sum_saturate() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);

        let mut acc = max;
        acc += max;
        assert_eq!(acc, max);

        let total: Money = [max, max, Money::from_cents(5)].iter().sum();
        assert_eq!(total, max);

        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
    }
}
