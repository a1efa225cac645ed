//! # Error Types
//!
//! The settlement error taxonomy for mason-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settlement Error Taxonomy                          │
//! │                                                                         │
//! │  SettlementError (this file)                                           │
//! │  ├── Validation(ValidationError)   - blocks submission locally         │
//! │  ├── BalanceRule(BalanceRuleViolation) - hard payment/return rules     │
//! │  └── Rejected { message }          - backend refused; verbatim text    │
//! │                                                                         │
//! │  SettlementWarning (not an error)                                      │
//! │  └── clampable cases auto-corrected and surfaced to the operator       │
//! │                                                                         │
//! │  mason-session errors (separate crate)                                 │
//! │  └── SessionError - what the SPA sees (kind + message)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. The three kinds are distinguishable by VARIANT, never by message text,
//!    so the UI layer picks presentation without parsing strings
//! 3. Clampable cases (discounts, return amount) are warnings, not errors:
//!    the engine corrects the value and tells the operator
//! 4. No error here is fatal - every path returns the caller to drafting

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failures.
///
/// Always recoverable locally: the draft is incomplete or malformed, the
/// submission is blocked, and the external collaborator is never contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed identifier).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The cart has no priced lines.
    #[error("cart has no items")]
    EmptyCart,

    /// A cart operation referenced a product that is not in the cart.
    #[error("product {product_id} is not in the cart")]
    LineNotFound { product_id: String },

    /// The cart is at its line limit.
    #[error("cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Registered mode selected but no client chosen.
    #[error("no client selected")]
    ClientRequired,

    /// A discount is present somewhere in the cart but no reason was given.
    #[error("a discount requires a reason")]
    DiscountReasonRequired,

    /// A return was drafted without a reason.
    #[error("a return requires a reason")]
    ReturnReasonRequired,

    /// A return was drafted with no items selected.
    #[error("no items selected for return")]
    NoReturnItems,
}

// =============================================================================
// Balance Rule Violation
// =============================================================================

/// Hard business-rule failures around payment and returns.
///
/// These are the non-clampable cases: the engine cannot correct the value on
/// the operator's behalf, so the settlement is refused outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceRuleViolation {
    /// Walk-in sale tendered less than the cart total.
    /// Walk-in buyers have no account to absorb a shortfall.
    #[error("full payment required: short by {shortfall}")]
    WalkInUnderpayment { shortfall: Money },

    /// Walk-in sale tendered more than the cart total.
    /// Walk-in buyers have no account to credit the excess to.
    #[error("overpayment not allowed for walk-in: over by {excess}")]
    WalkInOverpayment { excess: Money },

    /// The selected client account is suspended.
    /// Checked before classification, for every cart/payment combination.
    #[error("client account {client_id} is suspended")]
    ClientSuspended { client_id: String },

    /// A return references a product the original transaction never sold.
    #[error("product {product_id} is not on the referenced transaction")]
    ReturnItemNotOnOriginal { product_id: String },

    /// A return requests more units than remain returnable on a line.
    #[error(
        "return quantity {requested} exceeds returnable {returnable} for product {product_id}"
    )]
    ReturnQuantityExceeded {
        product_id: String,
        requested: i64,
        returnable: i64,
    },

    /// The referenced transaction carries no returnable items
    /// (a deposit or another return).
    #[error("transaction {transaction_id} cannot be returned against")]
    NotReturnable { transaction_id: String },
}

// =============================================================================
// Settlement Error
// =============================================================================

/// Top-level error for the settlement engine.
///
/// The three variants are the three kinds of failure a caller can see;
/// matching on the variant is the supported way to choose presentation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Local input validation failed; nothing was sent anywhere.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A payment or return rule was violated; nothing was sent anywhere.
    #[error("balance rule violated: {0}")]
    BalanceRule(#[from] BalanceRuleViolation),

    /// The external collaborator refused the request (stale balance,
    /// stale stock, ...). The message is the server's, surfaced verbatim.
    /// The engine performs no retry and leaves all local state unmutated.
    #[error("settlement rejected: {message}")]
    Rejected { message: String },
}

// =============================================================================
// Settlement Warning
// =============================================================================

/// Non-fatal feedback surfaced to the operator alongside a successful
/// computation.
///
/// Clampable rule violations are corrected automatically (the corrected
/// value is what flows onward) and reported here; a warning never blocks a
/// settlement on its own. Serialized, because warnings travel inside cart
/// totals and return records all the way to the SPA.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum SettlementWarning {
    /// A percentage discount above 100% was corrected to exactly 100%.
    #[error("discount above 100% corrected to 100%")]
    DiscountPercentClamped { requested_bps: u32 },

    /// A flat line discount above the line base was corrected to the base.
    #[error("discount {requested} exceeds line amount; corrected to {ceiling}")]
    DiscountAmountClamped { requested: Money, ceiling: Money },

    /// A cart-wide discount above the subtotal was corrected to the subtotal.
    #[error("cart discount {requested} exceeds subtotal; corrected to {ceiling}")]
    CartDiscountClamped { requested: Money, ceiling: Money },

    /// A return amount above the computed ceiling was corrected down to it.
    #[error("return amount {requested} exceeds computed value; corrected to {ceiling}")]
    ReturnAmountClamped { requested: Money, ceiling: Money },

    /// The settlement leaves the client owing money. Allowed, but the
    /// operator must see it before submitting.
    #[error("client balance will go to {new_balance} (debt)")]
    ClientGoesIntoDebt { new_balance: Money },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with SettlementError.
pub type SettlementResult<T> = Result<T, SettlementError>;

// =============================================================================
// Unit Tests
// =============================================================================
