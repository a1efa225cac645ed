//! # Terminal Session
//!
//! The stateful shell around the pure settlement engine: one cart draft per
//! terminal, the injected submission boundary, and the broadcast channel
//! that republishes confirmed settlements to the UI.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Terminal Session Operations                          │
//! │                                                                         │
//! │  SPA Action            Session Operation         State Change           │
//! │  ──────────            ─────────────────         ────────────           │
//! │                                                                         │
//! │  Add product ─────────► with_cart_mut(add_line)─► cart grows            │
//! │                                                                         │
//! │  Tender & submit ─────► settle_sale()                                   │
//! │       │                     │                                           │
//! │       │       snapshot cart, classify (pure), submit (async)            │
//! │       │                     │                                           │
//! │       │          ┌──────────┴──────────┐                                │
//! │       │     confirmed               rejected                            │
//! │       │          │                     │                                │
//! │       │   broadcast event         error to caller                       │
//! │       │   clear cart              cart UNTOUCHED                        │
//! │       │                                                                 │
//! │  NOTE: the cached client balance is NEVER mutated here. The backend     │
//! │  serializes concurrent settlements from other counters; the confirmed   │
//! │  record it returns is the only authoritative balance.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<CartDraft>>`: several command handlers
//! may touch it, one at a time, and every lock is held only for the closure
//! passed in.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use mason_core::cart::CartDraft;
use mason_core::settlement::{classify_settlement, SettlementDraft};
use mason_core::validation::validate_entity_id;
use mason_core::{
    validate_return, Buyer, Client, Money, PaymentMethod, ReturnDraft, SettlementWarning,
    Transaction, TransactionParty, ValidationError,
};

use crate::config::TerminalConfig;
use crate::error::{ErrorKind, SessionError};
use crate::submit::{
    DepositRequest, ReturnRequest, SaleRequest, SettlementRequest, SettlementSubmitter,
};

// =============================================================================
// Events & Outcomes
// =============================================================================

/// Pushed to every subscriber when the backend confirms a settlement, so
/// open views (client ledger, dashboards) can refresh without polling.
#[derive(Debug, Clone)]
pub enum SettlementEvent {
    Confirmed { transaction: Transaction },
}

/// A settlement that reached the `Settled` state.
#[derive(Debug, Clone)]
pub struct SettledOutcome {
    /// The server-confirmed record, with authoritative balance fields.
    pub transaction: Transaction,

    /// Clamp corrections and debt notices gathered on the way; the UI shows
    /// these with the receipt.
    pub warnings: Vec<SettlementWarning>,
}

// =============================================================================
// Terminal Session
// =============================================================================

/// One staff terminal's session state.
pub struct TerminalSession {
    config: TerminalConfig,
    cart: Arc<Mutex<CartDraft>>,
    submitter: Arc<dyn SettlementSubmitter>,
    events: broadcast::Sender<SettlementEvent>,
}

impl TerminalSession {
    /// Creates a session with an empty cart.
    pub fn new(config: TerminalConfig, submitter: Arc<dyn SettlementSubmitter>) -> Self {
        let (events, _) = broadcast::channel(64);
        TerminalSession {
            config,
            cart: Arc::new(Mutex::new(CartDraft::new())),
            submitter,
            events,
        }
    }

    /// The terminal's static configuration.
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Subscribes to confirmed-settlement events.
    pub fn subscribe(&self) -> broadcast::Receiver<SettlementEvent> {
        self.events.subscribe()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartDraft) -> R,
    {
        let cart = self.cart.lock().expect("cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartDraft) -> R,
    {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        f(&mut cart)
    }

    // -------------------------------------------------------------------------
    // Settlement Operations
    // -------------------------------------------------------------------------

    /// Settles the drafted cart: classify locally, submit, and on
    /// confirmation clear the cart and broadcast the record.
    ///
    /// `tendered_input` is the raw text of the tender field; it is
    /// sanitized to digits before interpretation.
    ///
    /// Any failure — validation, balance rule, or backend rejection —
    /// leaves the cart exactly as drafted.
    pub async fn settle_sale(
        &self,
        buyer: Buyer,
        tendered_input: &str,
        payment_method: PaymentMethod,
    ) -> Result<SettledOutcome, SessionError> {
        let cart = self.with_cart(|c| c.clone());
        debug!(
            terminal = %self.config.terminal_id,
            lines = cart.line_count(),
            "settle_sale"
        );

        let classified = classify_settlement(SettlementDraft {
            buyer,
            cart,
            amount_tendered: Money::parse_user_amount(tendered_input),
            payment_method,
        })?;

        let request = SettlementRequest::Sale(SaleRequest::from_classified(&classified));
        let transaction = self.submit_and_publish(request).await?;

        // Only a confirmed settlement clears the draft.
        self.with_cart_mut(|c| c.clear());

        info!(
            terminal = %self.config.terminal_id,
            transaction_id = %transaction.id,
            kind = transaction.kind_name(),
            total = %self.config.format_amount(classified.total),
            "settlement confirmed"
        );

        Ok(SettledOutcome {
            transaction,
            warnings: classified.warnings,
        })
    }

    /// Pre-validates and submits a return against an original transaction.
    ///
    /// `prior_returns` are the RETURN records already fetched for the same
    /// reference; the backend remains the final guard on returned
    /// quantities.
    pub async fn settle_return(
        &self,
        client: &Client,
        original: &Transaction,
        prior_returns: &[Transaction],
        draft: ReturnDraft,
    ) -> Result<SettledOutcome, SessionError> {
        match &original.party {
            TransactionParty::Client { client_id } if *client_id == client.id => {}
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "reference transaction id".to_string(),
                    reason: "transaction does not belong to the selected client".to_string(),
                }
                .into())
            }
        }

        let validated = validate_return(original, prior_returns, draft)
            .map_err(SessionError::from)?;

        let warnings: Vec<SettlementWarning> = validated.warning.clone().into_iter().collect();
        let request = SettlementRequest::Return(ReturnRequest::from_validated(client, &validated));
        let transaction = self.submit_and_publish(request).await?;

        info!(
            terminal = %self.config.terminal_id,
            transaction_id = %transaction.id,
            amount = %self.config.format_amount(validated.amount_returned),
            "return confirmed"
        );

        Ok(SettledOutcome {
            transaction,
            warnings,
        })
    }

    /// Records a deposit onto a client account.
    pub async fn record_deposit(
        &self,
        client: &Client,
        amount_input: &str,
        payment_method: PaymentMethod,
    ) -> Result<SettledOutcome, SessionError> {
        validate_entity_id("client id", &client.id).map_err(SessionError::from)?;

        let amount = Money::parse_user_amount(amount_input);
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "deposit amount".to_string(),
            }
            .into());
        }

        let request = SettlementRequest::Deposit(DepositRequest {
            request_id: uuid::Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            kind: "DEPOSIT".to_string(),
            amount_paid: amount,
            payment_method,
        });
        let transaction = self.submit_and_publish(request).await?;

        info!(
            terminal = %self.config.terminal_id,
            transaction_id = %transaction.id,
            amount = %self.config.format_amount(amount),
            "deposit confirmed"
        );

        Ok(SettledOutcome {
            transaction,
            warnings: Vec::new(),
        })
    }

    /// Submits a request and, on confirmation, broadcasts the record.
    async fn submit_and_publish(
        &self,
        request: SettlementRequest,
    ) -> Result<Transaction, SessionError> {
        let transaction = self.submitter.submit(&request).await.map_err(|rejection| {
            warn!(
                terminal = %self.config.terminal_id,
                message = %rejection.message,
                "settlement rejected by backend"
            );
            SessionError::new(ErrorKind::Rejected, rejection.message)
        })?;

        // A closed receiver set just means no view is listening right now.
        let _ = self.events.send(SettlementEvent::Confirmed {
            transaction: transaction.clone(),
        });

        Ok(transaction)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex as StdMutex;

    use mason_core::types::{CatalogEntry, TransactionItem, TransactionKind};
    use crate::submit::SubmitRejection;

    // -------------------------------------------------------------------------
    // Mock submitter
    // -------------------------------------------------------------------------

    enum Mode {
        Confirm(Transaction),
        Reject(String),
    }

    struct MockSubmitter {
        mode: Mode,
        requests: StdMutex<Vec<SettlementRequest>>,
    }

    impl MockSubmitter {
        fn confirming(transaction: Transaction) -> Arc<Self> {
            Arc::new(MockSubmitter {
                mode: Mode::Confirm(transaction),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn rejecting(message: &str) -> Arc<Self> {
            Arc::new(MockSubmitter {
                mode: Mode::Reject(message.to_string()),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> SettlementRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl SettlementSubmitter for MockSubmitter {
        async fn submit(
            &self,
            request: &SettlementRequest,
        ) -> Result<Transaction, SubmitRejection> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.mode {
                Mode::Confirm(t) => Ok(t.clone()),
                Mode::Reject(m) => Err(SubmitRejection::new(m.clone())),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    fn cement() -> CatalogEntry {
        CatalogEntry {
            product_id: "cement-50kg".to_string(),
            name: "Cement 50kg".to_string(),
            unit: "bag".to_string(),
            unit_price: Money::from_minor(1200),
            stock: 400,
            is_active: true,
        }
    }

    fn client(balance: i64) -> Client {
        Client {
            id: "665f1c2ab9d4e0a1b2c3d4e5".to_string(),
            name: "Karim Construction".to_string(),
            phone: None,
            balance: Money::from_minor(balance),
            is_active: true,
        }
    }

    fn confirmed_purchase(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            party: TransactionParty::Client {
                client_id: client(0).id,
            },
            created_at: Utc::now(),
            balance_before: Some(Money::zero()),
            balance_after: Some(Money::zero()),
            kind: TransactionKind::Purchase {
                items: vec![TransactionItem::new(
                    "cement-50kg",
                    "Cement 50kg",
                    "bag",
                    Money::from_minor(1200),
                    10,
                )],
                subtotal: Money::from_minor(12000),
                discount: Money::zero(),
                total: Money::from_minor(12000),
                amount_paid: Money::from_minor(12000),
                payment_method: PaymentMethod::Cash,
                reason: None,
            },
        }
    }

    fn session_with(submitter: Arc<MockSubmitter>) -> TerminalSession {
        TerminalSession::new(TerminalConfig::default(), submitter)
    }

    // -------------------------------------------------------------------------
    // Settle sale
    // -------------------------------------------------------------------------

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("mason_session=debug")
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn test_confirmed_sale_clears_cart_and_broadcasts() {
        init_tracing();
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-1"));
        let session = session_with(submitter.clone());
        let mut events = session.subscribe();

        session.with_cart_mut(|c| c.add_line(&cement(), 10)).unwrap();

        let outcome = session
            .settle_sale(
                Buyer::Registered { client: client(0) },
                "12,000",
                PaymentMethod::Cash,
            )
            .await
            .unwrap();

        assert_eq!(outcome.transaction.id, "t-1");
        assert!(session.with_cart(|c| c.is_empty()));
        assert_eq!(submitter.request_count(), 1);

        let SettlementEvent::Confirmed { transaction } = events.try_recv().unwrap();
        assert_eq!(transaction.id, "t-1");
    }

    #[tokio::test]
    async fn test_rejected_sale_leaves_cart_intact() {
        let submitter = MockSubmitter::rejecting("balance changed since fetch");
        let session = session_with(submitter.clone());
        let mut events = session.subscribe();

        session.with_cart_mut(|c| c.add_line(&cement(), 10)).unwrap();

        let err = session
            .settle_sale(
                Buyer::Registered { client: client(0) },
                "12000",
                PaymentMethod::Cash,
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Rejected);
        assert_eq!(err.message, "balance changed since fetch");
        assert_eq!(session.with_cart(|c| c.line_count()), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_the_backend() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-1"));
        let session = session_with(submitter.clone());

        let err = session
            .settle_sale(
                Buyer::Registered { client: client(0) },
                "100",
                PaymentMethod::Cash,
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(submitter.request_count(), 0);
    }

    #[tokio::test]
    async fn test_suspended_client_never_reaches_the_backend() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-1"));
        let session = session_with(submitter.clone());
        session.with_cart_mut(|c| c.add_line(&cement(), 10)).unwrap();

        let mut suspended = client(0);
        suspended.is_active = false;

        let err = session
            .settle_sale(
                Buyer::Registered { client: suspended },
                "12000",
                PaymentMethod::Cash,
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::BalanceRule);
        assert_eq!(submitter.request_count(), 0);
        assert_eq!(session.with_cart(|c| c.line_count()), 1);
    }

    #[tokio::test]
    async fn test_short_tender_submits_pickup_on_credit() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-2"));
        let session = session_with(submitter.clone());
        session.with_cart_mut(|c| c.add_line(&cement(), 10)).unwrap();

        session
            .settle_sale(
                Buyer::Registered { client: client(0) },
                "5000",
                PaymentMethod::Cash,
            )
            .await
            .unwrap();

        match submitter.last_request() {
            SettlementRequest::Sale(r) => {
                assert_eq!(
                    r.kind,
                    mason_core::settlement::SettlementKind::Pickup
                );
                assert_eq!(r.payment_method, PaymentMethod::OnCredit);
                assert_eq!(r.amount_paid.minor(), 5000);
            }
            other => panic!("expected a sale request, got {:?}", other),
        }
    }

    // -------------------------------------------------------------------------
    // Deposits & returns
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_deposit_requires_positive_amount() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-3"));
        let session = session_with(submitter.clone());

        let err = session
            .record_deposit(&client(0), "0", PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(submitter.request_count(), 0);
    }

    #[tokio::test]
    async fn test_deposit_submits_and_broadcasts() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-4"));
        let session = session_with(submitter.clone());
        let mut events = session.subscribe();

        session
            .record_deposit(&client(0), "5,000", PaymentMethod::BankTransfer)
            .await
            .unwrap();

        match submitter.last_request() {
            SettlementRequest::Deposit(r) => {
                assert_eq!(r.amount_paid.minor(), 5000);
                assert_eq!(r.kind, "DEPOSIT");
            }
            other => panic!("expected a deposit request, got {:?}", other),
        }
        assert!(events.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_return_validated_and_submitted() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-5"));
        let session = session_with(submitter.clone());

        let original = confirmed_purchase("t-1");
        let draft = ReturnDraft {
            reference_transaction_id: "t-1".to_string(),
            items: vec![mason_core::ReturnItem {
                product_id: "cement-50kg".to_string(),
                quantity: 4,
                unit: "bag".to_string(),
            }],
            amount_returned: Money::from_minor(9999),
            reason: "damaged bags".to_string(),
        };

        let outcome = session
            .settle_return(&client(0), &original, &[], draft)
            .await
            .unwrap();

        // 4 × 1200 = 4800 ceiling; the requested 9999 was clamped, with a
        // warning carried onto the outcome.
        match submitter.last_request() {
            SettlementRequest::Return(r) => {
                assert_eq!(r.actual_amount_returned.minor(), 4800);
                assert_eq!(r.kind, "RETURN");
            }
            other => panic!("expected a return request, got {:?}", other),
        }
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_return_for_wrong_client_rejected() {
        let submitter = MockSubmitter::confirming(confirmed_purchase("t-6"));
        let session = session_with(submitter.clone());

        let mut other_client = client(0);
        other_client.id = "someone-else".to_string();

        let original = confirmed_purchase("t-1");
        let draft = ReturnDraft {
            reference_transaction_id: "t-1".to_string(),
            items: vec![mason_core::ReturnItem {
                product_id: "cement-50kg".to_string(),
                quantity: 1,
                unit: "bag".to_string(),
            }],
            amount_returned: Money::from_minor(1200),
            reason: "damaged bags".to_string(),
        };

        let err = session
            .settle_return(&other_client, &original, &[], draft)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(submitter.request_count(), 0);
    }
}
