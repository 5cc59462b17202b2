//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    sum lines as floats, round once at the end → totals drift by a cent │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    tax is computed and rounded PER LINE in integer math,               │
//! │    then summed - the totals are exact, every time                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;            // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for variance at shift close
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents. Only the
    /// presentation layer converts to dollars for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounding half up to the nearest cent.
    ///
    /// ## Rounding Policy
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF UP, PER LINE                                            │
    /// │                                                                     │
    /// │  Tax is rounded at the point it is computed for each cart line,    │
    /// │  and the rounded values are summed into the cart totals:           │
    /// │                                                                     │
    /// │    $6.00 × 14%   = 84.0¢  → 84¢                                    │
    /// │    $10.00 × 8.25% = 82.5¢ → 83¢ (half rounds up)                   │
    /// │                                                                     │
    /// │  Never sum floating approximations and round once at the end -     │
    /// │  different implementations would disagree by a cent.               │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// Integer math over i128: `(amount × bps + 5000) / 10000`.
    /// The +5000 provides the half-up rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let line = Money::from_cents(600); // $6.00
    /// let rate = TaxRate::from_bps(1400); // 14%
    ///
    /// assert_eq!(line.calculate_tax(rate).cents(), 84);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 prevents overflow on large amounts
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_subtotal = unit_price.multiply_quantity(3);
    /// assert_eq!(line_subtotal.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
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

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(1000); // 10%
        let tax = amount.calculate_tax(rate);
        assert_eq!(tax.cents(), 100);
    }

    #[test]
    fn test_tax_calculation_rounds_half_up() {
        // $10.00 at 8.25% = $0.825 → $0.83
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(825);
        let tax = amount.calculate_tax(rate);
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_tax_calculation_fourteen_percent() {
        // $6.00 at 14% = $0.84 exactly
        let amount = Money::from_cents(600);
        let rate = TaxRate::from_bps(1400);
        assert_eq!(amount.calculate_tax(rate).cents(), 84);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_subtotal = unit_price.multiply_quantity(3);
        assert_eq!(line_subtotal.cents(), 897);
    }
}
