//! # Line Pricer
//!
//! Computes a cart line's chargeable total from quantity, unit price and a
//! per-line discount.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line Pricing                                                           │
//! │                                                                         │
//! │  quantity × unit_price ──► base                                         │
//! │                             │                                           │
//! │       Discount::Percent(bps)│  bps clamped to [0, 10000] ── warning     │
//! │       Discount::Amount(m)   │  m clamped to [0, base]   ── warning      │
//! │                             ▼                                           │
//! │  line_total = max(0, base − discount_amount)                            │
//! │                                                                         │
//! │  A clamp is a CORRECTION, not an error: the corrected discount is       │
//! │  what flows onward and what prints on the receipt.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SettlementWarning;
use crate::money::Money;

// =============================================================================
// Discount
// =============================================================================

/// A per-line (or cart-wide) discount.
///
/// Percentages are basis points: 10000 = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "discount_type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// A flat amount off the line base.
    Amount(Money),

    /// A percentage of the line base, in basis points.
    Percent(u32),
}

// =============================================================================
// Priced Line
// =============================================================================

/// The result of pricing one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedLine {
    /// Pre-discount value: quantity × unit_price.
    pub base: Money,

    /// The discount actually applied, after clamping.
    pub discount_amount: Money,

    /// Chargeable total: max(0, base − discount_amount).
    pub line_total: Money,

    /// Set when the requested discount had to be corrected.
    pub warning: Option<SettlementWarning>,
}

/// Prices a single line.
///
/// ## Contract
/// - `quantity` is a non-negative integer, already clamped to available
///   stock by the caller at entry time
/// - `quantity == 0` prices to zero regardless of any discount
/// - A percentage above 100% is corrected to exactly 100%
/// - A flat discount above the line base is corrected to the base
/// - A negative line total never escapes
///
/// ## Example
/// ```rust
/// use mason_core::money::Money;
/// use mason_core::pricing::{price_line, Discount};
///
/// let line = price_line(10, Money::from_minor(500), Some(Discount::Percent(1000)));
/// assert_eq!(line.base.minor(), 5000);
/// assert_eq!(line.discount_amount.minor(), 500); // 10%
/// assert_eq!(line.line_total.minor(), 4500);
/// assert!(line.warning.is_none());
/// ```
pub fn price_line(quantity: i64, unit_price: Money, discount: Option<Discount>) -> PricedLine {
    // A negative quantity or unit price prices like an empty line; the
    // invariant that nothing negative escapes starts at the base.
    let base = unit_price.multiply_quantity(quantity.max(0));
    let base = if base.is_negative() { Money::zero() } else { base };

    let (discount_amount, warning) = match discount {
        None => (Money::zero(), None),
        Some(Discount::Percent(bps)) => {
            if bps > 10000 {
                (
                    base, // exactly 100%
                    Some(SettlementWarning::DiscountPercentClamped { requested_bps: bps }),
                )
            } else {
                (base.fraction_bps(bps), None)
            }
        }
        Some(Discount::Amount(amount)) => {
            if amount > base {
                (
                    base,
                    Some(SettlementWarning::DiscountAmountClamped {
                        requested: amount,
                        ceiling: base,
                    }),
                )
            } else {
                (amount.clamp_to(Money::zero(), base), None)
            }
        }
    };

    let line_total = (base - discount_amount).clamp_to(Money::zero(), base);

    PricedLine {
        base,
        discount_amount,
        line_total,
        warning,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_discount() {
        let line = price_line(3, Money::from_minor(299), None);
        assert_eq!(line.base.minor(), 897);
        assert_eq!(line.discount_amount.minor(), 0);
        assert_eq!(line.line_total.minor(), 897);
        assert!(line.warning.is_none());
    }

    #[test]
    fn test_amount_discount_exact() {
        // discount ≤ base: line_total = base − discount, exactly
        let line = price_line(10, Money::from_minor(500), Some(Discount::Amount(Money::from_minor(750))));
        assert_eq!(line.line_total.minor(), 5000 - 750);
        assert!(line.warning.is_none());
    }

    #[test]
    fn test_amount_discount_clamped_to_base() {
        // discount > base: corrected to base, total floors at zero
        let line = price_line(2, Money::from_minor(100), Some(Discount::Amount(Money::from_minor(900))));
        assert_eq!(line.discount_amount.minor(), 200);
        assert_eq!(line.line_total.minor(), 0);
        assert!(matches!(
            line.warning,
            Some(SettlementWarning::DiscountAmountClamped { .. })
        ));
    }

    #[test]
    fn test_percent_discount() {
        let line = price_line(10, Money::from_minor(500), Some(Discount::Percent(1500)));
        assert_eq!(line.discount_amount.minor(), 750); // 15% of 5000
        assert_eq!(line.line_total.minor(), 4250);
    }

    #[test]
    fn test_percent_above_hundred_clamps_to_hundred() {
        let line = price_line(10, Money::from_minor(500), Some(Discount::Percent(12500)));
        // effective discount equals exactly 100%
        assert_eq!(line.discount_amount.minor(), 5000);
        assert_eq!(line.line_total.minor(), 0);
        assert!(matches!(
            line.warning,
            Some(SettlementWarning::DiscountPercentClamped { requested_bps: 12500 })
        ));
    }

    #[test]
    fn test_zero_quantity_prices_to_zero() {
        let line = price_line(0, Money::from_minor(500), Some(Discount::Amount(Money::from_minor(100))));
        assert_eq!(line.base.minor(), 0);
        assert_eq!(line.line_total.minor(), 0);

        let line = price_line(0, Money::from_minor(500), Some(Discount::Percent(5000)));
        assert_eq!(line.line_total.minor(), 0);
    }

    #[test]
    fn test_negative_total_never_escapes() {
        // Even a clamped 100% discount cannot push below zero.
        let line = price_line(1, Money::from_minor(1), Some(Discount::Percent(10000)));
        assert_eq!(line.line_total.minor(), 0);
        assert!(!line.line_total.is_negative());
    }
}
