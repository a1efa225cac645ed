//! # Submission Boundary
//!
//! Outbound request records and the injected submitter seam.
//!
//! ## One Call, Two Outcomes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Submission Boundary                                 │
//! │                                                                         │
//! │  ClassifiedSettlement / ValidatedReturn                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  SettlementRequest ───► SettlementSubmitter::submit() ──┬─► confirmed   │
//! │  (plain data record)      (injected, async)             │   Transaction │
//! │                                                         │               │
//! │                                                         └─► rejection   │
//! │                                                             (verbatim)  │
//! │                                                                         │
//! │  The session performs NO retries and starts NO timers here. Transport  │
//! │  concerns (HTTP, auth, retries, timeouts) live behind the trait, in    │
//! │  whatever implementation the application shell injects.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two settlement attempts for the same client from two counters are
//! serialized by the BACKEND, never by client-side locking; the local
//! balance snapshot is allowed to be stale, and the server saying no to a
//! locally accepted classification is an ordinary rejection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use mason_core::settlement::{ClassifiedSettlement, SettlementKind};
use mason_core::{
    Buyer, Client, Money, PaymentMethod, ReturnItem, Transaction, ValidatedReturn, WalkInIdentity,
};

// =============================================================================
// Request Records
// =============================================================================

/// A line of a sale or return request: the backend resolves the product and
/// re-snapshots price/name itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit: String,
}

/// A PURCHASE/PICKUP submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// Idempotency key, minted per attempt.
    pub request_id: String,

    /// Registered client id; absent on walk-in sales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Walk-in identity; absent on registered sales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_in_client: Option<WalkInIdentity>,

    #[serde(rename = "type")]
    pub kind: SettlementKind,

    pub items: Vec<SubmissionItem>,

    /// What the buyer actually tendered (the prior balance contribution is
    /// the backend's to apply).
    pub amount_paid: Money,

    pub discount: Money,

    pub payment_method: PaymentMethod,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SaleRequest {
    /// Builds the wire record from a classified settlement.
    pub fn from_classified(settlement: &ClassifiedSettlement) -> Self {
        let (client_id, walk_in_client) = match &settlement.buyer {
            Buyer::Registered { client } => (Some(client.id.clone()), None),
            Buyer::WalkIn { identity } => (None, Some(identity.clone())),
        };

        SaleRequest {
            request_id: Uuid::new_v4().to_string(),
            client_id,
            walk_in_client,
            kind: settlement.kind,
            items: settlement
                .items
                .iter()
                .map(|i| SubmissionItem {
                    product_id: i.product_id.clone(),
                    quantity: i.quantity,
                    unit: i.unit.clone(),
                })
                .collect(),
            amount_paid: settlement.amount_tendered,
            discount: settlement.discount,
            payment_method: settlement.payment_method,
            notes: settlement.notes.clone(),
            reason: settlement.reason.clone(),
        }
    }
}

/// A RETURN submission, built from a core-validated return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    /// Idempotency key, minted per attempt.
    pub request_id: String,

    pub client_id: String,

    /// Always "RETURN".
    #[serde(rename = "type")]
    pub kind: String,

    pub reference_transaction_id: String,

    pub items: Vec<ReturnItem>,

    /// The clamped, validated amount to credit back.
    pub actual_amount_returned: Money,

    pub reason: String,
}

impl ReturnRequest {
    /// Builds the wire record from a validated return.
    pub fn from_validated(client: &Client, validated: &ValidatedReturn) -> Self {
        ReturnRequest {
            request_id: Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            kind: "RETURN".to_string(),
            reference_transaction_id: validated.reference_transaction_id.clone(),
            items: validated.items.clone(),
            actual_amount_returned: validated.amount_returned,
            reason: validated.reason.clone(),
        }
    }
}

/// A DEPOSIT submission (money in, no goods).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    /// Idempotency key, minted per attempt.
    pub request_id: String,

    pub client_id: String,

    /// Always "DEPOSIT".
    #[serde(rename = "type")]
    pub kind: String,

    pub amount_paid: Money,

    pub payment_method: PaymentMethod,
}

/// Any outbound settlement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettlementRequest {
    Sale(SaleRequest),
    Return(ReturnRequest),
    Deposit(DepositRequest),
}

// =============================================================================
// Submitter Seam
// =============================================================================

/// The backend said no. The message is surfaced to the operator verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SubmitRejection {
    pub message: String,
}

impl SubmitRejection {
    pub fn new(message: impl Into<String>) -> Self {
        SubmitRejection {
            message: message.into(),
        }
    }
}

/// The injected persistence boundary.
///
/// One atomic external operation: either the server-confirmed transaction
/// (with authoritative `balance_after`) comes back and supersedes the local
/// draft, or the request failed and the draft is discarded unchanged.
#[async_trait]
pub trait SettlementSubmitter: Send + Sync {
    async fn submit(&self, request: &SettlementRequest)
        -> Result<Transaction, SubmitRejection>;
}

// =============================================================================
// Unit Tests
// =============================================================================
