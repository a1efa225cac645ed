//! # Validation Module
//!
//! Field-level validation utilities for the settlement engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: SPA forms                                                    │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + the settlement/return business rules           │
//! │  ├── Field checks before any business rule runs                        │
//! │  └── Blocks submission locally; backend never contacted                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend service                                              │
//! │  └── Source of truth; may still reject a locally valid draft           │
//! │                                                                         │
//! │  Defense in depth: each layer catches what the one above missed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_REASON_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a person name (walk-in buyer, client).
///
/// ## Rules
/// - Must not be blank
/// - Must be at most 120 characters
pub fn validate_person_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a discount or return reason.
///
/// ## Rules
/// - Must not be blank (the caller decides WHEN a reason is required;
///   this only checks that a given reason is usable)
/// - Must be at most [`MAX_REASON_LENGTH`] characters
///
/// ## Returns
/// The trimmed reason string.
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > MAX_REASON_LENGTH {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LENGTH,
        });
    }

    Ok(reason.to_string())
}

/// Validates a backend entity identifier (client id, transaction id).
///
/// Backend ids are opaque strings; the only local rules are non-empty and a
/// sane length bound.
pub fn validate_entity_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a sale unit string ("bag", "ton", ...).
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: 30,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0) — a zero-quantity line has no place in a cart
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// The Line Pricer itself tolerates quantity 0 (it prices to zero); this
/// check guards the cart mutation path, where a zero would be an operator
/// mistake.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that an amount is not negative.
///
/// ## Rules
/// - Zero is allowed (a pickup can be tendered at zero)
pub fn validate_amount_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("walk-in name", "Ali Traders").is_ok());
        assert!(validate_person_name("walk-in name", "").is_err());
        assert!(validate_person_name("walk-in name", "   ").is_err());
        assert!(validate_person_name("walk-in name", &"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert_eq!(
            validate_reason("  bulk order rate  ").unwrap(),
            "bulk order rate"
        );
        assert!(validate_reason("").is_err());
        assert!(validate_reason(&"x".repeat(MAX_REASON_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("client id", "665f1c2ab9d4e0a1b2c3d4e5").is_ok());
        assert!(validate_entity_id("client id", "").is_err());
        assert!(validate_entity_id("client id", &"a".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("bag").is_ok());
        assert!(validate_unit("").is_err());
        assert!(validate_unit(&"u".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amount_non_negative() {
        assert!(validate_amount_non_negative("tendered", Money::zero()).is_ok());
        assert!(validate_amount_non_negative("tendered", Money::from_minor(100)).is_ok());
        assert!(validate_amount_non_negative("tendered", Money::from_minor(-1)).is_err());
    }
}
