//! # mason-core: Pure Settlement Logic for Mason POS
//!
//! This crate is the **heart** of Mason POS. It contains the client account
//! settlement engine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mason POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SPA Frontend                                │   │
//! │  │   Sale Form ──► Cart ──► Tender ──► Client Ledger ──► Returns   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    mason-session                                │   │
//! │  │    cart state, terminal config, submission, confirmations       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mason-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │  │ pricing │ │  cart   │ │settlement│ │  ledger  │ │ money  │  │   │
//! │  │  │ Line    │ │ Draft + │ │ Classify │ │ Balance  │ │ Minor  │  │   │
//! │  │  │ Pricer  │ │ Totals  │ │ + rules  │ │ fold     │ │ units  │  │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          Remote persistence API (external collaborator)         │   │
//! │  │     one call, two outcomes: confirmed record | rejection        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Transaction, CatalogEntry, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Line Pricer: discounts, clamps, floor at zero
//! - [`cart`] - Cart Aggregator: totals and discount precedence
//! - [`settlement`] - Settlement Classifier: walk-in/registered rules
//! - [`ledger`] - Running-balance fold and return validation
//! - [`error`] - The settlement error taxonomy
//! - [`validation`] - Field-level validators
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Nothing settles locally**: only a backend-confirmed record mutates
//!    a balance; every local result is a draft until then
//!
//! ## Example Usage
//!
//! ```rust
//! use mason_core::cart::CartDraft;
//! use mason_core::money::Money;
//! use mason_core::settlement::{classify_settlement, SettlementDraft, SettlementKind};
//! use mason_core::types::{Buyer, CatalogEntry, PaymentMethod};
//!
//! let cement = CatalogEntry {
//!     product_id: "cement-50kg".into(),
//!     name: "Cement 50kg".into(),
//!     unit: "bag".into(),
//!     unit_price: Money::from_minor(1200),
//!     stock: 400,
//!     is_active: true,
//! };
//!
//! let mut cart = CartDraft::new();
//! cart.add_line(&cement, 10).unwrap();
//!
//! let settlement = classify_settlement(SettlementDraft {
//!     buyer: Buyer::walk_in("Ali", None).unwrap(),
//!     cart,
//!     amount_tendered: Money::parse_user_amount("12,000"),
//!     payment_method: PaymentMethod::Cash,
//! })
//! .unwrap();
//!
//! assert_eq!(settlement.kind, SettlementKind::Purchase);
//! assert_eq!(settlement.total.minor(), 12000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mason_core::Money` instead of
// `use mason_core::money::Money`

pub use cart::{CartDraft, CartLine, CartTotals};
pub use error::{
    BalanceRuleViolation, SettlementError, SettlementResult, SettlementWarning, ValidationError,
};
pub use ledger::{recompute_running_balance, validate_return, LedgerEntry, ReturnDraft, ValidatedReturn};
pub use money::Money;
pub use pricing::{price_line, Discount, PricedLine};
pub use settlement::{
    classify_settlement, ClassifiedSettlement, SettlementDraft, SettlementKind,
    ValidatedSettlement,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tolerance for the walk-in full-payment check, in minor units.
///
/// ## Business Reason
/// Walk-in tender must equal the total, but rounding at the till can leave
/// a one-minor-unit difference either way. Anything beyond it is a real
/// over/underpayment and is rejected.
pub const PAYMENT_TOLERANCE: Money = Money::from_minor(1);

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9999;

/// Maximum length of a discount/return reason.
pub const MAX_REASON_LENGTH: usize = 500;
