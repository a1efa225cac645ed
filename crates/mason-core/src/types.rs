//! # Domain Types
//!
//! Core domain types for the Mason POS settlement engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogEntry   │   │     Client      │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  id             │   │  id             │       │
//! │  │  unit_price     │   │  balance (±)    │   │  party          │       │
//! │  │  unit, stock    │   │  is_active      │   │  kind (tagged)  │       │
//! │  │  is_active      │   │                 │   │  balance_before │       │
//! │  └─────────────────┘   └─────────────────┘   │  balance_after  │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  TransactionKind (closed, tagged by "type")                 │       │
//! │  │  PURCHASE │ PICKUP │ DEPOSIT │ RETURN                       │       │
//! │  │  Each variant carries ONLY the fields that apply to it.     │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Transaction items freeze product name/unit/price at sale time, decoupled
//! from the live catalog, so historical receipts never change when a product
//! is renamed or repriced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog Entry
// =============================================================================

/// An inbound product snapshot from the inventory collaborator.
///
/// Used only to seed cart line defaults. Stock clamping happens at entry
/// time in the caller; the engine treats line quantities as already-clamped
/// facts.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogEntry {
    /// Backend identifier for the product.
    pub product_id: String,

    /// Display name shown on cart lines and receipts.
    pub name: String,

    /// Sale unit ("bag", "ton", "length", ...).
    pub unit: String,

    /// Unit price in minor units.
    pub unit_price: Money,

    /// Current stock level at fetch time.
    pub stock: i64,

    /// Whether the product is currently sellable (soft delete).
    pub is_active: bool,
}

// =============================================================================
// Client & Walk-In Identity
// =============================================================================

/// A registered client account.
///
/// ## Balance Sign Convention
/// - positive = credit owed TO the client
/// - negative = debt owed BY the client
/// - zero = settled
///
/// The balance is only ever mutated by the backend on a confirmed
/// settlement; locally it is a snapshot that may be stale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    /// Backend identifier.
    pub id: String,

    /// Client display name.
    pub name: String,

    /// Contact phone, if recorded.
    pub phone: Option<String>,

    /// Signed running balance.
    pub balance: Money,

    /// Suspension flag. `false` blocks any new PURCHASE/PICKUP settlement.
    pub is_active: bool,
}

/// An unregistered buyer. No persisted balance, so every walk-in
/// transaction must be fully paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WalkInIdentity {
    /// Buyer name as given at the counter.
    pub name: String,

    /// Contact phone, if given.
    pub phone: Option<String>,
}

/// Who a settlement is for.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Buyer {
    /// A registered client; prior balance participates in classification.
    Registered { client: Client },

    /// A walk-in buyer; no balance, full payment required.
    WalkIn { identity: WalkInIdentity },
}

impl Buyer {
    /// Builds a registered buyer from the SPA's client picker state.
    /// `None` means the operator never selected a client.
    pub fn registered(client: Option<Client>) -> Result<Self, crate::error::ValidationError> {
        match client {
            Some(client) => Ok(Buyer::Registered { client }),
            None => Err(crate::error::ValidationError::ClientRequired),
        }
    }

    /// Builds a walk-in buyer, validating the name field.
    pub fn walk_in(
        name: &str,
        phone: Option<String>,
    ) -> Result<Self, crate::error::ValidationError> {
        crate::validation::validate_person_name("walk-in name", name)?;
        Ok(Buyer::WalkIn {
            identity: WalkInIdentity {
                name: name.trim().to_string(),
                phone,
            },
        })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,

    /// Bank transfer reference.
    BankTransfer,

    /// Cheque payment.
    Cheque,

    /// Sentinel recorded when goods leave without full payment.
    /// Never user-selectable on a fully paid sale; the classifier forces it
    /// onto every PICKUP.
    OnCredit,
}

// =============================================================================
// Transaction
// =============================================================================

/// A frozen line item on a transaction.
///
/// Invariant: `subtotal == unit_price × quantity` at creation time, and the
/// record is never mutated afterward. Construct through [`TransactionItem::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionItem {
    pub product_id: String,

    /// Product name at sale time (frozen).
    pub product_name: String,

    /// Sale unit at sale time (frozen).
    pub unit: String,

    /// Unit price at sale time (frozen).
    pub unit_price: Money,

    /// Quantity sold.
    pub quantity: i64,

    /// Pre-discount line value (unit_price × quantity).
    pub subtotal: Money,
}

impl TransactionItem {
    /// Creates a line snapshot, computing the subtotal from its parts.
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        unit: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        TransactionItem {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit: unit.into(),
            unit_price,
            quantity,
            subtotal: unit_price.multiply_quantity(quantity),
        }
    }
}

/// A line in a RETURN request payload.
///
/// The server is the source of truth for stock and balance effects; this
/// record only carries what the operator selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit: String,
}

/// Whose ledger a transaction belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "party", rename_all = "snake_case")]
pub enum TransactionParty {
    /// A registered client's ledger.
    Client { client_id: String },

    /// An ephemeral walk-in identity; no ledger, kept for the receipt only.
    WalkIn { name: String, phone: Option<String> },
}

/// The type-specific payload of a transaction.
///
/// Closed and tagged by `type`: PURCHASE/PICKUP/DEPOSIT/RETURN each carry
/// only the fields that apply, so optional-field guessing never leaks into
/// callers. Note that PICKUP has no payment method — a pickup is by
/// definition on credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// A fully covered sale (tender plus any applied credit ≥ total).
    Purchase {
        items: Vec<TransactionItem>,
        subtotal: Money,
        discount: Money,
        total: Money,
        amount_paid: Money,
        payment_method: PaymentMethod,
        /// Required whenever `discount` is non-zero.
        reason: Option<String>,
    },

    /// Goods left without full payment; the shortfall went on the client's
    /// account.
    Pickup {
        items: Vec<TransactionItem>,
        subtotal: Money,
        discount: Money,
        total: Money,
        amount_paid: Money,
        /// Required whenever `discount` is non-zero.
        reason: Option<String>,
    },

    /// Money in, no goods. Increases the client's balance.
    Deposit {
        amount_paid: Money,
        payment_method: PaymentMethod,
    },

    /// A validated partial return against an earlier PURCHASE/PICKUP.
    Return {
        reference_transaction_id: String,
        items: Vec<TransactionItem>,
        /// The value actually credited back; at most the sum of the
        /// returned lines at their original unit prices.
        amount_returned: Money,
        reason: String,
    },
}

/// An immutable transaction record.
///
/// `balance_before`/`balance_after` are computed (by the backend on
/// confirmation, or by the ledger fold locally) — never authored by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Backend identifier.
    pub id: String,

    /// Whose ledger this belongs to.
    pub party: TransactionParty,

    /// Authoritative ordering key for the balance fold.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Client balance before this transaction applied.
    pub balance_before: Option<Money>,

    /// Client balance after this transaction applied.
    pub balance_after: Option<Money>,

    /// Type-specific payload.
    pub kind: TransactionKind,
}

impl Transaction {
    /// The signed contribution of this transaction to a running balance.
    ///
    /// ```text
    /// DEPOSIT          → +amount_paid
    /// PURCHASE/PICKUP  → amount_paid − total
    /// RETURN           → +amount_returned
    /// ```
    pub fn signed_effect(&self) -> Money {
        match &self.kind {
            TransactionKind::Deposit { amount_paid, .. } => *amount_paid,
            TransactionKind::Purchase {
                total, amount_paid, ..
            }
            | TransactionKind::Pickup {
                total, amount_paid, ..
            } => *amount_paid - *total,
            TransactionKind::Return {
                amount_returned, ..
            } => *amount_returned,
        }
    }

    /// The sold line items, if this kind carries any.
    /// PURCHASE and PICKUP do; DEPOSIT and RETURN do not sell anything.
    pub fn sold_items(&self) -> Option<&[TransactionItem]> {
        match &self.kind {
            TransactionKind::Purchase { items, .. }
            | TransactionKind::Pickup { items, .. } => Some(items),
            TransactionKind::Deposit { .. } | TransactionKind::Return { .. } => None,
        }
    }

    /// Wire name of the transaction type.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TransactionKind::Purchase { .. } => "PURCHASE",
            TransactionKind::Pickup { .. } => "PICKUP",
            TransactionKind::Deposit { .. } => "DEPOSIT",
            TransactionKind::Return { .. } => "RETURN",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
