//! # mason-session: Terminal Session Layer for Mason POS
//!
//! Everything stateful around the pure settlement engine lives here: the
//! cart a terminal is drafting, the terminal's configuration, the injected
//! submission boundary, and the broadcast channel that pushes confirmed
//! settlements back to open views.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Mason POS Session Layer                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  mason-session (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────────┐  ┌──────────────┐  ┌──────────────────────┐ │   │
//! │  │  │TerminalSession│  │ TerminalConfig│ │ SettlementSubmitter  │ │   │
//! │  │  │ (session.rs)  │  │ (config.rs)  │  │ (submit.rs, trait)   │ │   │
//! │  │  │               │  │              │  │                      │ │   │
//! │  │  │ cart state,   │  │ TOML + env   │  │ injected transport;  │ │   │
//! │  │  │ settle/return │  │ overrides    │  │ one call, two        │ │   │
//! │  │  │ /deposit ops  │  │              │  │ outcomes             │ │   │
//! │  │  └───────┬───────┘  └──────────────┘  └──────────────────────┘ │   │
//! │  │          │                                                      │   │
//! │  │          └── broadcast::channel ──► SettlementEvent::Confirmed  │   │
//! │  │                                     (ledger views refresh)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  DEPENDENCIES:                                                         │
//! │  • mason-core: every settlement rule; this crate adds NO rules of      │
//! │    its own, only state and plumbing                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod session;
pub mod submit;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::TerminalConfig;
pub use error::{ErrorKind, SessionError};
pub use session::{SettledOutcome, SettlementEvent, TerminalSession};
pub use submit::{
    DepositRequest, ReturnRequest, SaleRequest, SettlementRequest, SettlementSubmitter,
    SubmissionItem, SubmitRejection,
};
