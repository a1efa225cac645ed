//! # Ledger Balance Recomputation & Return Validation
//!
//! The client statement math: a chronological fold that annotates every
//! transaction with its balance-before/after pair, and the pre-validation
//! of partial returns against an original transaction.
//!
//! ## The Fold
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Running Balance                                                        │
//! │                                                                         │
//! │  sort ascending by created_at   (storage order is NOT trusted)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anchor = earliest.balance_before  (0 when absent)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each txn:  after = before + signed_effect                          │
//! │                                                                         │
//! │    DEPOSIT          → +amount_paid                                      │
//! │    PURCHASE/PICKUP  → amount_paid − total                               │
//! │    RETURN           → +amount_returned                                  │
//! │                                                                         │
//! │  The balance is a FOLD, never an independently stored fact: recomputing │
//! │  over the same list always reproduces the same sequence. Display order  │
//! │  (newest first) is the caller's concern and never flips the fold.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Return Pre-Validation
//! The backend is the source of truth for stock and balance effects; the
//! checks here exist to stop invalid submissions at the terminal. Quantities
//! already returned are reconstructed best-effort from the prior RETURN
//! records the terminal has fetched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{BalanceRuleViolation, SettlementResult, SettlementWarning, ValidationError};
use crate::money::Money;
use crate::types::{ReturnItem, Transaction, TransactionKind};
use crate::validation::{
    validate_amount_non_negative, validate_entity_id, validate_quantity, validate_reason,
    validate_unit,
};

// =============================================================================
// Ledger Entry
// =============================================================================

/// One transaction annotated with its running-balance pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerEntry {
    pub transaction_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Wire name of the transaction type (PURCHASE, PICKUP, ...).
    pub kind: String,

    /// This transaction's signed contribution.
    pub effect: Money,

    pub balance_before: Money,
    pub balance_after: Money,
}

/// Recomputes the running balance over a client's transaction history.
///
/// Pure function: same input, same annotated sequence, every time. The
/// returned entries are in chronological (fold) order; reverse for a
/// newest-first display.
///
/// ## Ordering
/// Ascending `created_at`, stable — transactions stamped at the same
/// instant keep their arrival order instead of reordering unpredictably.
pub fn recompute_running_balance(transactions: &[Transaction]) -> Vec<LedgerEntry> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.created_at);

    // Anchor at the earliest transaction's recorded opening balance; a
    // history with no recorded opening starts from a settled account.
    let mut balance = ordered
        .first()
        .and_then(|t| t.balance_before)
        .unwrap_or_else(Money::zero);

    let mut entries = Vec::with_capacity(ordered.len());
    for txn in ordered {
        let effect = txn.signed_effect();
        let before = balance;
        balance += effect;
        entries.push(LedgerEntry {
            transaction_id: txn.id.clone(),
            created_at: txn.created_at,
            kind: txn.kind_name().to_string(),
            effect,
            balance_before: before,
            balance_after: balance,
        });
    }
    entries
}

// =============================================================================
// Return Validation
// =============================================================================

/// A return as drafted by the operator, before any checking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnDraft {
    /// The original PURCHASE/PICKUP being returned against.
    pub reference_transaction_id: String,

    /// Lines the operator selected for return.
    pub items: Vec<ReturnItem>,

    /// The value to credit back. Staff may adjust this downward (e.g. a
    /// restocking fee); raising it above the computed ceiling is clamped.
    pub amount_returned: Money,

    /// Mandatory explanation.
    pub reason: String,
}

/// A return that passed pre-validation and is ready to submit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidatedReturn {
    pub reference_transaction_id: String,
    pub items: Vec<ReturnItem>,

    /// Σ quantity × original unit price across the selected lines.
    pub ceiling: Money,

    /// The amount that will be credited, after clamping to the ceiling.
    pub amount_returned: Money,

    pub reason: String,

    /// Set when the requested amount was corrected down to the ceiling.
    pub warning: Option<SettlementWarning>,
}

/// Validates a drafted return against the original transaction and any
/// prior returns already recorded against it.
///
/// ## Checks
/// - the draft references the transaction it was validated against
/// - the reference carries returnable items (not a DEPOSIT/RETURN)
/// - at least one item selected; reason present and usable
/// - every item exists on the original, and its quantity fits within
///   `original − already returned`
/// - `amount_returned` is non-negative and at most the computed ceiling
///   (clamped with a warning, mirroring the discount clamp)
pub fn validate_return(
    original: &Transaction,
    prior_returns: &[Transaction],
    draft: ReturnDraft,
) -> SettlementResult<ValidatedReturn> {
    validate_entity_id("reference transaction id", &draft.reference_transaction_id)?;
    if draft.reference_transaction_id != original.id {
        return Err(ValidationError::InvalidFormat {
            field: "reference transaction id".to_string(),
            reason: "does not match the fetched original transaction".to_string(),
        }
        .into());
    }

    let original_items = original.sold_items().ok_or_else(|| {
        BalanceRuleViolation::NotReturnable {
            transaction_id: original.id.clone(),
        }
    })?;

    if draft.items.is_empty() {
        return Err(ValidationError::NoReturnItems.into());
    }

    let reason = validate_reason(&draft.reason).map_err(|e| match e {
        ValidationError::Required { .. } => ValidationError::ReturnReasonRequired,
        other => other,
    })?;

    validate_amount_non_negative("return amount", draft.amount_returned)?;

    let mut ceiling = Money::zero();
    for (idx, item) in draft.items.iter().enumerate() {
        validate_quantity(item.quantity)?;
        validate_unit(&item.unit)?;

        let original_line = original_items
            .iter()
            .find(|l| l.product_id == item.product_id)
            .ok_or_else(|| BalanceRuleViolation::ReturnItemNotOnOriginal {
                product_id: item.product_id.clone(),
            })?;

        // Units already returned in prior RETURNs against this reference,
        // plus any earlier line of this draft for the same product.
        let already_returned = quantity_already_returned(prior_returns, &original.id, &item.product_id)
            + draft.items[..idx]
                .iter()
                .filter(|i| i.product_id == item.product_id)
                .map(|i| i.quantity)
                .sum::<i64>();

        let returnable = original_line.quantity - already_returned;
        if item.quantity > returnable {
            return Err(BalanceRuleViolation::ReturnQuantityExceeded {
                product_id: item.product_id.clone(),
                requested: item.quantity,
                returnable: returnable.max(0),
            }
            .into());
        }

        ceiling += original_line.unit_price.multiply_quantity(item.quantity);
    }

    let (amount_returned, warning) = if draft.amount_returned > ceiling {
        (
            ceiling,
            Some(SettlementWarning::ReturnAmountClamped {
                requested: draft.amount_returned,
                ceiling,
            }),
        )
    } else {
        (draft.amount_returned, None)
    };

    Ok(ValidatedReturn {
        reference_transaction_id: draft.reference_transaction_id,
        items: draft.items,
        ceiling,
        amount_returned,
        reason,
        warning,
    })
}

/// Sums the quantity of one product already returned against a reference.
fn quantity_already_returned(
    prior_returns: &[Transaction],
    reference_id: &str,
    product_id: &str,
) -> i64 {
    prior_returns
        .iter()
        .filter_map(|t| match &t.kind {
            TransactionKind::Return {
                reference_transaction_id,
                items,
                ..
            } if reference_transaction_id == reference_id => Some(items),
            _ => None,
        })
        .flatten()
        .filter(|i| i.product_id == product_id)
        .map(|i| i.quantity)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettlementError;
    use crate::types::{PaymentMethod, TransactionItem, TransactionParty};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn txn(id: &str, secs: i64, kind: TransactionKind) -> Transaction {
        Transaction {
            id: id.to_string(),
            party: TransactionParty::Client {
                client_id: "c-1".to_string(),
            },
            created_at: at(secs),
            balance_before: None,
            balance_after: None,
            kind,
        }
    }

    fn purchase(id: &str, secs: i64, total: i64, paid: i64) -> Transaction {
        txn(
            id,
            secs,
            TransactionKind::Purchase {
                items: vec![TransactionItem::new(
                    "cement-50kg",
                    "Cement 50kg",
                    "bag",
                    Money::from_minor(500),
                    10,
                )],
                subtotal: Money::from_minor(total),
                discount: Money::zero(),
                total: Money::from_minor(total),
                amount_paid: Money::from_minor(paid),
                payment_method: PaymentMethod::Cash,
                reason: None,
            },
        )
    }

    fn deposit(id: &str, secs: i64, amount: i64) -> Transaction {
        txn(
            id,
            secs,
            TransactionKind::Deposit {
                amount_paid: Money::from_minor(amount),
                payment_method: PaymentMethod::Cash,
            },
        )
    }

    // -------------------------------------------------------------------------
    // Running balance fold
    // -------------------------------------------------------------------------

    #[test]
    fn test_fold_annotates_before_and_after() {
        let history = vec![
            deposit("t-1", 0, 5000),
            purchase("t-2", 10, 12000, 7000), // effect −5000
            deposit("t-3", 20, 2000),
        ];

        let entries = recompute_running_balance(&history);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].balance_before.minor(), 0);
        assert_eq!(entries[0].balance_after.minor(), 5000);

        assert_eq!(entries[1].balance_before.minor(), 5000);
        assert_eq!(entries[1].balance_after.minor(), 0);

        assert_eq!(entries[2].balance_before.minor(), 0);
        assert_eq!(entries[2].balance_after.minor(), 2000);
    }

    #[test]
    fn test_fold_ignores_storage_order() {
        let chronological = vec![
            deposit("t-1", 0, 5000),
            purchase("t-2", 10, 12000, 7000),
            deposit("t-3", 20, 2000),
        ];
        let shuffled = vec![
            chronological[2].clone(),
            chronological[0].clone(),
            chronological[1].clone(),
        ];

        assert_eq!(
            recompute_running_balance(&chronological),
            recompute_running_balance(&shuffled)
        );
    }

    #[test]
    fn test_fold_is_idempotent() {
        let history = vec![
            purchase("t-1", 0, 8000, 3000),
            deposit("t-2", 5, 10000),
            purchase("t-3", 9, 4000, 4000),
        ];
        let once = recompute_running_balance(&history);
        let twice = recompute_running_balance(&history);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fold_anchors_at_recorded_opening_balance() {
        let mut first = purchase("t-1", 0, 1000, 1000);
        first.balance_before = Some(Money::from_minor(7500));
        let history = vec![first, deposit("t-2", 5, 500)];

        let entries = recompute_running_balance(&history);
        assert_eq!(entries[0].balance_before.minor(), 7500);
        assert_eq!(entries[0].balance_after.minor(), 7500);
        assert_eq!(entries[1].balance_after.minor(), 8000);
    }

    #[test]
    fn test_return_effect_credits_balance() {
        let history = vec![
            purchase("t-1", 0, 12000, 12000),
            txn(
                "t-2",
                10,
                TransactionKind::Return {
                    reference_transaction_id: "t-1".to_string(),
                    items: vec![TransactionItem::new(
                        "cement-50kg",
                        "Cement 50kg",
                        "bag",
                        Money::from_minor(500),
                        4,
                    )],
                    amount_returned: Money::from_minor(2000),
                    reason: "damaged bags".to_string(),
                },
            ),
        ];

        let entries = recompute_running_balance(&history);
        assert_eq!(entries[1].effect.minor(), 2000);
        assert_eq!(entries[1].balance_after.minor(), 2000);
    }

    // -------------------------------------------------------------------------
    // Return validation
    // -------------------------------------------------------------------------

    fn return_draft(qty: i64, amount: i64) -> ReturnDraft {
        ReturnDraft {
            reference_transaction_id: "t-1".to_string(),
            items: vec![ReturnItem {
                product_id: "cement-50kg".to_string(),
                quantity: qty,
                unit: "bag".to_string(),
            }],
            amount_returned: Money::from_minor(amount),
            reason: "damaged bags".to_string(),
        }
    }

    #[test]
    fn test_return_quantity_above_original_rejected() {
        // original line: quantity 10 at 500
        let original = purchase("t-1", 0, 5000, 5000);
        let err = validate_return(&original, &[], return_draft(12, 5000)).unwrap_err();
        assert!(matches!(
            err,
            SettlementError::BalanceRule(BalanceRuleViolation::ReturnQuantityExceeded {
                requested: 12,
                returnable: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_return_amount_clamped_to_ceiling() {
        let original = purchase("t-1", 0, 5000, 5000);
        let validated = validate_return(&original, &[], return_draft(10, 6000)).unwrap();
        assert_eq!(validated.ceiling.minor(), 5000);
        assert_eq!(validated.amount_returned.minor(), 5000);
        assert!(matches!(
            validated.warning,
            Some(SettlementWarning::ReturnAmountClamped { .. })
        ));
    }

    #[test]
    fn test_return_amount_adjusted_down_is_kept() {
        // staff applied a restocking fee
        let original = purchase("t-1", 0, 5000, 5000);
        let validated = validate_return(&original, &[], return_draft(10, 4500)).unwrap();
        assert_eq!(validated.amount_returned.minor(), 4500);
        assert!(validated.warning.is_none());
    }

    #[test]
    fn test_prior_returns_reduce_returnable_quantity() {
        let original = purchase("t-1", 0, 5000, 5000);
        let prior = txn(
            "t-9",
            100,
            TransactionKind::Return {
                reference_transaction_id: "t-1".to_string(),
                items: vec![TransactionItem::new(
                    "cement-50kg",
                    "Cement 50kg",
                    "bag",
                    Money::from_minor(500),
                    6,
                )],
                amount_returned: Money::from_minor(3000),
                reason: "damaged bags".to_string(),
            },
        );

        // 10 − 6 already returned = 4 returnable
        let err = validate_return(&original, &[prior.clone()], return_draft(5, 2500)).unwrap_err();
        assert!(matches!(
            err,
            SettlementError::BalanceRule(BalanceRuleViolation::ReturnQuantityExceeded {
                returnable: 4,
                ..
            })
        ));

        assert!(validate_return(&original, &[prior], return_draft(4, 2000)).is_ok());
    }

    #[test]
    fn test_return_item_not_on_original_rejected() {
        let original = purchase("t-1", 0, 5000, 5000);
        let mut draft = return_draft(1, 100);
        draft.items[0].product_id = "sand-ton".to_string();
        assert!(matches!(
            validate_return(&original, &[], draft),
            Err(SettlementError::BalanceRule(
                BalanceRuleViolation::ReturnItemNotOnOriginal { .. }
            ))
        ));
    }

    #[test]
    fn test_return_against_deposit_rejected() {
        let original = deposit("t-1", 0, 5000);
        assert!(matches!(
            validate_return(&original, &[], return_draft(1, 100)),
            Err(SettlementError::BalanceRule(
                BalanceRuleViolation::NotReturnable { .. }
            ))
        ));
    }

    #[test]
    fn test_return_with_no_items_rejected() {
        let original = purchase("t-1", 0, 5000, 5000);
        let mut draft = return_draft(1, 100);
        draft.items.clear();
        assert!(matches!(
            validate_return(&original, &[], draft),
            Err(SettlementError::Validation(ValidationError::NoReturnItems))
        ));
    }

    #[test]
    fn test_return_with_blank_reason_rejected() {
        let original = purchase("t-1", 0, 5000, 5000);
        let mut draft = return_draft(1, 100);
        draft.reason = "  ".to_string();
        assert!(matches!(
            validate_return(&original, &[], draft),
            Err(SettlementError::Validation(
                ValidationError::ReturnReasonRequired
            ))
        ));
    }

    #[test]
    fn test_duplicate_draft_lines_share_the_returnable_budget() {
        let original = purchase("t-1", 0, 5000, 5000);
        let draft = ReturnDraft {
            reference_transaction_id: "t-1".to_string(),
            items: vec![
                ReturnItem {
                    product_id: "cement-50kg".to_string(),
                    quantity: 6,
                    unit: "bag".to_string(),
                },
                ReturnItem {
                    product_id: "cement-50kg".to_string(),
                    quantity: 6,
                    unit: "bag".to_string(),
                },
            ],
            amount_returned: Money::from_minor(6000),
            reason: "damaged bags".to_string(),
        };
        assert!(matches!(
            validate_return(&original, &[], draft),
            Err(SettlementError::BalanceRule(
                BalanceRuleViolation::ReturnQuantityExceeded { .. }
            ))
        ));
    }

    #[test]
    fn test_mismatched_reference_rejected() {
        let original = purchase("t-1", 0, 5000, 5000);
        let mut draft = return_draft(1, 100);
        draft.reference_transaction_id = "t-2".to_string();
        assert!(matches!(
            validate_return(&original, &[], draft),
            Err(SettlementError::Validation(_))
        ));
    }
}
