//! # Validation Module
//!
//! Input validation utilities for Tillpoint.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (external)                                      │
//! │  └── Basic format checks, immediate user feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Terminal services (Rust)                                     │
//! │  └── THIS MODULE: business rule validation, before any mutation        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / UNIQUE constraints as a backstop               │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Name Validators
// =============================================================================

/// Validates a category name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 100 characters
pub fn validate_category_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "category name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "category name".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "product name".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Normalizes a name for duplicate comparison: trimmed and lowercased.
///
/// Category uniqueness is case-insensitive; "Drinks", " drinks " and
/// "DRINKS" all normalize to the same key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
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

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a cash amount (opening or counted) in cents.
///
/// ## Rules
/// - Must be non-negative; a drawer cannot hold negative cash
pub fn validate_cash_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates an entity id (UUID v4 string format).
pub fn validate_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
