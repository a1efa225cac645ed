//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a running-balance ledger the damage compounds: every settlement     │
//! │  folds the previous balance forward, so a fractional error introduced   │
//! │  once is carried into every statement after it.                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    Every amount is an i64 count of the smallest currency unit.          │
//! │    The payment tolerance (±0.01) becomes exactly 1 minor unit.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mason_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor(1099); // 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                    // 21.98
//! let total = price + Money::from_minor(500); // 15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: A client balance is signed — positive means credit
///   owed to the client, negative means debt owed by the client
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mason_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use mason_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99);
    /// assert_eq!(price.minor(), 1099);
    ///
    /// let debt = Money::from_major_minor(-5, 50); // -5.50
    /// assert_eq!(debt.minor(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses raw user input from an amount field into a Money value.
    ///
    /// Tender fields on the sale form accept free text; everything except
    /// ASCII digits is stripped before the remainder is read as a count of
    /// minor units. Group separators, currency labels and stray whitespace
    /// all disappear the same way.
    ///
    /// ## Example
    /// ```rust
    /// use mason_core::money::Money;
    ///
    /// assert_eq!(Money::parse_user_amount("1,250").minor(), 1250);
    /// assert_eq!(Money::parse_user_amount("Rs 1250").minor(), 1250);
    /// assert_eq!(Money::parse_user_amount("").minor(), 0);
    /// assert_eq!(Money::parse_user_amount("no digits").minor(), 0);
    /// ```
    ///
    /// Inputs with more digits than i64 can hold saturate at `i64::MAX`
    /// rather than wrapping; such an amount can never match a cart total, so
    /// it is rejected downstream by the payment rules.
    pub fn parse_user_amount(input: &str) -> Self {
        let mut minor: i64 = 0;
        for c in input.chars() {
            if let Some(d) = c.to_digit(10) {
                minor = minor
                    .saturating_mul(10)
                    .saturating_add(i64::from(d));
            }
        }
        Money(minor)
    }

    /// Returns the value in minor units (smallest currency unit).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use mason_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).major(), 10);
    /// assert_eq!(Money::from_minor(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mason_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(500);
    /// let line_base = unit_price.multiply_quantity(10);
    /// assert_eq!(line_base.minor(), 5000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the given fraction of this amount, expressed in basis points.
    ///
    /// ## Basis Points
    /// 1 basis point = 0.01% = 1/10000. A 15% line discount is 1500 bps.
    ///
    /// ## Implementation
    /// Integer math with an i128 intermediate to prevent overflow on large
    /// amounts. The +5000 term rounds half up: `(amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use mason_core::money::Money;
    ///
    /// let base = Money::from_minor(10000);
    /// assert_eq!(base.fraction_bps(1500).minor(), 1500); // 15% of 100.00
    /// assert_eq!(base.fraction_bps(10000).minor(), 10000); // 100%
    /// ```
    pub fn fraction_bps(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_minor(part as i64)
    }

    /// Clamps the value to the inclusive range `[lo, hi]`.
    #[inline]
    pub fn clamp_to(&self, lo: Money, hi: Money) -> Money {
        Money(self.0.clamp(lo.0, hi.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and log output. Currency symbol and locale
/// formatting belong to the frontend (see `TerminalConfig`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation (flips credit to debt and back).
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
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

/// Multiplication by i64.
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
