//! # Session Error Type
//!
//! Unified error type handed to the SPA layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Error Flow in Mason POS                               │
//! │                                                                         │
//! │  SPA                         Rust Session Layer                         │
//! │  ───                         ──────────────────                         │
//! │                                                                         │
//! │  settleSale(...)                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  TerminalSession operation                                       │  │
//! │  │  Result<T, SessionError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  core ValidationError ──────────► kind = VALIDATION ───────────► │  │
//! │  │  core BalanceRuleViolation ─────► kind = BALANCE_RULE ─────────► │  │
//! │  │  backend refusal ───────────────► kind = REJECTED (verbatim) ──► │  │
//! │  │  config failure ────────────────► kind = CONFIG ───────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  switch (e.kind) { ... }   // presentation chosen WITHOUT parsing      │
//! │                            // message text                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use mason_core::SettlementError;

/// Session error returned from terminal operations.
///
/// ## Serialization
/// This is what the SPA receives when an operation fails:
/// ```json
/// {
///   "kind": "BALANCE_RULE",
///   "message": "full payment required: short by 100.00"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionError {
    /// Machine-readable error kind for programmatic handling.
    pub kind: ErrorKind,

    /// Human-readable message for display.
    pub message: String,
}

/// Error kinds for session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Local input validation failed; nothing was submitted.
    Validation,

    /// A payment or return rule was violated; nothing was submitted.
    BalanceRule,

    /// The backend refused the request; message is the server's, verbatim.
    Rejected,

    /// Terminal configuration could not be loaded or parsed.
    Config,

    /// Anything that should not happen in normal operation.
    Internal,
}

impl SessionError {
    /// Creates a new session error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        SessionError {
            kind,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SessionError::new(ErrorKind::Validation, message)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SessionError::new(ErrorKind::Config, message)
    }
}

/// Maps the core taxonomy onto the SPA-facing kinds.
impl From<SettlementError> for SessionError {
    fn from(err: SettlementError) -> Self {
        let kind = match &err {
            SettlementError::Validation(_) => ErrorKind::Validation,
            SettlementError::BalanceRule(_) => ErrorKind::BalanceRule,
            SettlementError::Rejected { .. } => ErrorKind::Rejected,
        };
        // For Rejected the inner message is the server's own text; keep it
        // verbatim rather than the wrapped display form.
        let message = match err {
            SettlementError::Rejected { message } => message,
            other => other.to_string(),
        };
        SessionError::new(kind, message)
    }
}

impl From<mason_core::ValidationError> for SessionError {
    fn from(err: mason_core::ValidationError) -> Self {
        SessionError::validation(err.to_string())
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for SessionError {}

// =============================================================================
// Unit Tests
// =============================================================================
