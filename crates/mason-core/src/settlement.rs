//! # Settlement Classifier
//!
//! Turns a priced cart, a tendered amount and a buyer into a classified,
//! balance-updating settlement.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               One Transaction's Creation                                │
//! │                                                                         │
//! │  SettlementDraft ──validate()──► ValidatedSettlement                    │
//! │        │                               │                                │
//! │        │                          classify()                            │
//! │        │                               │                                │
//! │        │                               ▼                                │
//! │        │                      ClassifiedSettlement ──submit──► Settled  │
//! │        │                               │            (mason-session)     │
//! │        └──────── any failure ──────────┴──► Err(SettlementError)        │
//! │                                              = Rejected, nothing        │
//! │                                                persisted anywhere       │
//! │                                                                         │
//! │  CLASSIFICATION RULES                                                   │
//! │  ────────────────────                                                   │
//! │  Walk-in:     effective = tendered                                      │
//! │               |effective − total| ≤ 1 minor unit  → PURCHASE            │
//! │               short → WalkInUnderpayment, over → WalkInOverpayment      │
//! │                                                                         │
//! │  Registered:  effective = tendered + prior_balance                      │
//! │               effective ≥ total → PURCHASE (method as selected)         │
//! │               effective < total → PICKUP   (method forced OnCredit)     │
//! │                                                                         │
//! │  new_balance = effective − total   (registered only)                    │
//! │  new_balance < 0 is ALLOWED, surfaced as ClientGoesIntoDebt warning     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The classifier never mutates a cached client balance: the backend is the
//! only writer, and a stale local snapshot means the server may still reject
//! a classification accepted here. That is an ordinary `Rejected` outcome.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{CartDraft, CartTotals};
use crate::error::{
    BalanceRuleViolation, SettlementResult, SettlementWarning, ValidationError,
};
use crate::money::Money;
use crate::types::{Buyer, PaymentMethod, TransactionItem};
use crate::validation::{
    validate_amount_non_negative, validate_entity_id, validate_person_name, validate_reason,
};
use crate::PAYMENT_TOLERANCE;

// =============================================================================
// Settlement Draft
// =============================================================================

/// The raw inputs of a settlement attempt, exactly as the terminal holds
/// them. Nothing is checked yet.
#[derive(Debug, Clone)]
pub struct SettlementDraft {
    /// Who is buying.
    pub buyer: Buyer,

    /// The drafted cart (lines, discounts, reason, notes).
    pub cart: CartDraft,

    /// Sanitized tender (see `Money::parse_user_amount`).
    pub amount_tendered: Money,

    /// Payment method the operator selected. May be overridden by
    /// classification (a PICKUP is always on credit).
    pub payment_method: PaymentMethod,
}

impl SettlementDraft {
    /// Drafting → Validated.
    ///
    /// Rejects: suspended registered client, blank walk-in name, empty
    /// cart, discount without reason, negative tender. On success the cart
    /// is frozen into item snapshots and totals.
    pub fn validate(self) -> SettlementResult<ValidatedSettlement> {
        match &self.buyer {
            Buyer::Registered { client } => {
                validate_entity_id("client id", &client.id)?;
                if !client.is_active {
                    return Err(BalanceRuleViolation::ClientSuspended {
                        client_id: client.id.clone(),
                    }
                    .into());
                }
            }
            Buyer::WalkIn { identity } => {
                validate_person_name("walk-in name", &identity.name)?;
            }
        }

        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        validate_amount_non_negative("amount tendered", self.amount_tendered)?;

        let totals = self.cart.totals();

        // A discount anywhere in the cart requires a usable reason.
        let reason = if totals.effective_discount.is_positive() {
            match self.cart.discount_reason.as_deref() {
                None => return Err(ValidationError::DiscountReasonRequired.into()),
                Some(r) => Some(validate_reason(r).map_err(|e| match e {
                    ValidationError::Required { .. } => ValidationError::DiscountReasonRequired,
                    other => other,
                })?),
            }
        } else {
            self.cart.discount_reason.clone()
        };

        Ok(ValidatedSettlement {
            buyer: self.buyer,
            items: self.cart.snapshot_items(),
            totals,
            amount_tendered: self.amount_tendered,
            payment_method: self.payment_method,
            reason,
            notes: self.cart.notes,
        })
    }
}

// =============================================================================
// Validated Settlement
// =============================================================================

/// A draft whose inputs passed validation. The cart is frozen; only
/// classification remains.
#[derive(Debug, Clone)]
pub struct ValidatedSettlement {
    pub buyer: Buyer,
    pub items: Vec<TransactionItem>,
    pub totals: CartTotals,
    pub amount_tendered: Money,
    pub payment_method: PaymentMethod,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl ValidatedSettlement {
    /// Validated → Classified.
    pub fn classify(self) -> SettlementResult<ClassifiedSettlement> {
        let total = self.totals.total;
        let mut warnings = self.totals.warnings.clone();

        let (kind, effective_amount_paid, payment_method, balance_before, new_balance) =
            match &self.buyer {
                Buyer::WalkIn { .. } => {
                    // No account to absorb a shortfall or hold an excess:
                    // tender must match the total to the minor unit.
                    let effective = self.amount_tendered;
                    let diff = effective - total;
                    if diff > PAYMENT_TOLERANCE {
                        return Err(BalanceRuleViolation::WalkInOverpayment { excess: diff }.into());
                    }
                    if diff < -PAYMENT_TOLERANCE {
                        return Err(
                            BalanceRuleViolation::WalkInUnderpayment { shortfall: -diff }.into(),
                        );
                    }
                    (
                        SettlementKind::Purchase,
                        effective,
                        self.payment_method,
                        None,
                        None,
                    )
                }
                Buyer::Registered { client } => {
                    // Existing credit (a positive balance) is applied
                    // automatically; existing debt only worsens coverage.
                    let prior = client.balance;
                    let effective = self.amount_tendered + prior;
                    let new_balance = effective - total;

                    if effective >= total {
                        (
                            SettlementKind::Purchase,
                            effective,
                            self.payment_method,
                            Some(prior),
                            Some(new_balance),
                        )
                    } else {
                        // Goods leave without full payment: the method must
                        // reflect that no real tender covered the shortfall.
                        (
                            SettlementKind::Pickup,
                            effective,
                            PaymentMethod::OnCredit,
                            Some(prior),
                            Some(new_balance),
                        )
                    }
                }
            };

        if let Some(balance) = new_balance {
            if balance.is_negative() {
                warnings.push(SettlementWarning::ClientGoesIntoDebt {
                    new_balance: balance,
                });
            }
        }

        Ok(ClassifiedSettlement {
            kind,
            buyer: self.buyer,
            items: self.items,
            subtotal: self.totals.subtotal,
            discount: self.totals.effective_discount,
            total,
            amount_tendered: self.amount_tendered,
            effective_amount_paid,
            payment_method,
            balance_before,
            new_balance,
            reason: self.reason,
            notes: self.notes,
            warnings,
        })
    }
}

// =============================================================================
// Classified Settlement
// =============================================================================

/// The settlement type chosen by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementKind {
    Purchase,
    Pickup,
}

/// A fully classified settlement, ready to hand to the submission boundary.
///
/// Nothing is settled yet: `new_balance` is the locally computed outcome,
/// and only the backend's confirmed record makes it real.
#[derive(Debug, Clone)]
pub struct ClassifiedSettlement {
    pub kind: SettlementKind,
    pub buyer: Buyer,
    pub items: Vec<TransactionItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,

    /// What the buyer actually handed over.
    pub amount_tendered: Money,

    /// Tender plus any prior balance contribution.
    pub effective_amount_paid: Money,

    /// As selected, except forced to `OnCredit` on a PICKUP.
    pub payment_method: PaymentMethod,

    /// Prior balance (registered buyers only).
    pub balance_before: Option<Money>,

    /// effective_amount_paid − total (registered buyers only).
    /// Positive = client ends in credit, negative = client ends in debt.
    pub new_balance: Option<Money>,

    pub reason: Option<String>,
    pub notes: Option<String>,

    /// Everything the operator must see before submitting: clamp
    /// corrections and the going-into-debt notice.
    pub warnings: Vec<SettlementWarning>,
}

/// Convenience: runs the full Drafting → Validated → Classified pipeline.
pub fn classify_settlement(draft: SettlementDraft) -> SettlementResult<ClassifiedSettlement> {
    draft.validate()?.classify()
}

// =============================================================================
// Unit Tests
// =============================================================================
