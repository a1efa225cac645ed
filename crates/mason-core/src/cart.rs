//! # Cart Aggregator
//!
//! The cart a staff terminal drafts before settlement, and the totals math
//! over it.
//!
//! ## Discount Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart Totals                                                            │
//! │                                                                         │
//! │  subtotal            = Σ line base (pre-discount)                       │
//! │  line_discount_total = Σ per-line discount amounts                      │
//! │                                                                         │
//! │  effective_discount:                                                    │
//! │    line_discount_total > 0  ──►  line_discount_total                    │
//! │    otherwise                ──►  cart_discount (flat, clamped)          │
//! │                                                                         │
//! │  Line discounts WIN and are NEVER combined with the cart discount.      │
//! │  This precedence decides which number prints on the receipt and must    │
//! │  be preserved exactly.                                                  │
//! │                                                                         │
//! │  total = subtotal − effective_discount                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding the same product merges
//!   quantities)
//! - Line prices are frozen at add time: a catalog reprice never changes a
//!   drafted cart
//! - Any non-zero effective discount requires a non-empty reason before
//!   settlement (enforced by the classifier's validation step)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{SettlementWarning, ValidationError};
use crate::money::Money;
use crate::pricing::{price_line, Discount, PricedLine};
use crate::types::{CatalogEntry, TransactionItem};
use crate::validation::{validate_amount_non_negative, validate_quantity, ValidationResult};
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// One drafted line.
///
/// ## Price Freezing
/// `unit_price` is captured when the line is added. If the product is
/// repriced in the catalog afterward, the drafted line keeps the price the
/// buyer was quoted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product ID (backend identifier).
    pub product_id: String,

    /// Product name at add time (frozen).
    pub product_name: String,

    /// Sale unit at add time (frozen).
    pub unit: String,

    /// Unit price at add time (frozen).
    pub unit_price: Money,

    /// Quantity, already clamped to available stock by the caller.
    pub quantity: i64,

    /// Optional per-line discount.
    pub discount: Option<Discount>,

    /// When this line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line from a catalog snapshot and quantity.
    pub fn from_catalog(entry: &CatalogEntry, quantity: i64) -> Self {
        CartLine {
            product_id: entry.product_id.clone(),
            product_name: entry.name.clone(),
            unit: entry.unit.clone(),
            unit_price: entry.unit_price,
            quantity,
            discount: None,
            added_at: Utc::now(),
        }
    }

    /// Prices this line through the Line Pricer.
    pub fn priced(&self) -> PricedLine {
        price_line(self.quantity, self.unit_price, self.discount)
    }

    /// Freezes this line into a transaction item snapshot.
    pub fn snapshot(&self) -> TransactionItem {
        TransactionItem::new(
            self.product_id.clone(),
            self.product_name.clone(),
            self.unit.clone(),
            self.unit_price,
            self.quantity,
        )
    }
}

// =============================================================================
// Cart Draft
// =============================================================================

/// The cart being drafted on a terminal.
#[derive(Debug, Clone, Serialize, Deserialize, Default, TS)]
#[ts(export)]
pub struct CartDraft {
    /// Drafted lines, in entry order.
    pub lines: Vec<CartLine>,

    /// Optional flat cart-wide discount. Fallback only: ignored entirely
    /// while any line carries its own discount.
    pub cart_discount: Option<Money>,

    /// Reason for whichever discount is in effect. Required (non-blank)
    /// whenever the effective discount is non-zero.
    pub discount_reason: Option<String>,

    /// Free-form note carried onto the settlement request.
    pub notes: Option<String>,
}

impl CartDraft {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        CartDraft::default()
    }

    /// Adds a product to the cart, merging quantity if the product is
    /// already drafted.
    pub fn add_line(&mut self, entry: &CatalogEntry, quantity: i64) -> ValidationResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == entry.product_id)
        {
            let merged = line.quantity + quantity;
            validate_quantity(merged)?;
            line.quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(ValidationError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_catalog(entry, quantity));
        Ok(())
    }

    /// Updates a line's quantity. Quantity 0 removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> ValidationResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(ValidationError::LineNotFound {
                product_id: product_id.to_string(),
            }),
        }
    }

    /// Sets or clears a line's discount.
    pub fn set_line_discount(
        &mut self,
        product_id: &str,
        discount: Option<Discount>,
    ) -> ValidationResult<()> {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.discount = discount;
                Ok(())
            }
            None => Err(ValidationError::LineNotFound {
                product_id: product_id.to_string(),
            }),
        }
    }

    /// Sets or clears the flat cart-wide discount.
    pub fn set_cart_discount(&mut self, discount: Option<Money>) -> ValidationResult<()> {
        if let Some(amount) = discount {
            validate_amount_non_negative("cart discount", amount)?;
        }
        self.cart_discount = discount;
        Ok(())
    }

    /// Removes a line by product ID.
    pub fn remove_line(&mut self, product_id: &str) -> ValidationResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == initial_len {
            Err(ValidationError::LineNotFound {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Clears the draft back to an empty cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.cart_discount = None;
        self.discount_reason = None;
        self.notes = None;
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of drafted lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Aggregates the drafted lines into settlement totals.
    pub fn totals(&self) -> CartTotals {
        let mut subtotal = Money::zero();
        let mut line_discount_total = Money::zero();
        let mut warnings = Vec::new();

        for line in &self.lines {
            let priced = line.priced();
            subtotal += priced.base;
            line_discount_total += priced.discount_amount;
            if let Some(w) = priced.warning {
                warnings.push(w);
            }
        }

        // Precedence: line discounts win outright; the flat cart discount is
        // a fallback used only when no line carries one.
        let effective_discount = if line_discount_total.is_positive() {
            line_discount_total
        } else {
            match self.cart_discount {
                None => Money::zero(),
                Some(amount) => {
                    if amount > subtotal {
                        warnings.push(SettlementWarning::CartDiscountClamped {
                            requested: amount,
                            ceiling: subtotal,
                        });
                        subtotal
                    } else {
                        amount.clamp_to(Money::zero(), subtotal)
                    }
                }
            }
        };

        CartTotals {
            line_count: self.line_count(),
            total_quantity: self.total_quantity(),
            subtotal,
            line_discount_total,
            effective_discount,
            total: subtotal - effective_discount,
            warnings,
        }
    }

    /// Freezes every line into a transaction item snapshot.
    pub fn snapshot_items(&self) -> Vec<TransactionItem> {
        self.lines.iter().map(CartLine::snapshot).collect()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Aggregated totals for a drafted cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,

    /// Pre-discount sum of line bases.
    pub subtotal: Money,

    /// Sum of per-line discount amounts.
    pub line_discount_total: Money,

    /// The discount that applies to this cart after precedence resolution.
    pub effective_discount: Money,

    /// What the buyer owes: subtotal − effective_discount.
    pub total: Money,

    /// Clamp corrections surfaced while aggregating.
    pub warnings: Vec<SettlementWarning>,
}

// =============================================================================
// Unit Tests
// =============================================================================
