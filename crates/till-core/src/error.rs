//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-store errors (separate crate)                                    │
//! │  └── StoreError       - Database operation failures                    │
//! │                                                                         │
//! │  till-terminal errors (session layer)                                  │
//! │  └── PosError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → PosError → UI        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, id, index)
//! 3. Errors are enum variants, never String
//! 4. Every condition produces an observable, classified outcome - there are
//!    no silently-ignored errors, and none of them crash the process

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Three families, all locally recoverable by the caller:
/// - validation outcomes (`InvalidQuantity`, `InvalidPrice`, `DuplicateCategory`,
///   `UnknownCategory`, `UnknownProduct`, `LineNotFound`, `EmptyCart`)
/// - authorization outcomes (`Unauthorized`)
/// - state-machine outcomes (`ShiftAlreadyOpen`, `ShiftNotOpen`, `CategoryInUse`)
///
/// State errors guard against invalid transitions rather than allowing and
/// repairing them afterwards. No variant mutates state before surfacing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An active category with the same (case-insensitive, trimmed) name
    /// already exists.
    #[error("Category '{name}' already exists")]
    DuplicateCategory { name: String },

    /// The category is still referenced by at least one active product and
    /// may not be deactivated.
    ///
    /// ## User Workflow
    /// ```text
    /// Deactivate "Drinks"
    ///      │
    ///      ▼
    /// Active products in "Drinks"? yes (Cola)
    ///      │
    ///      ▼
    /// CategoryInUse → UI shows "move or retire the products first"
    /// ```
    #[error("Category {id} has active products and cannot be deactivated")]
    CategoryInUse { id: String },

    /// Category id does not resolve to a currently active category.
    #[error("Category not found or inactive: {id}")]
    UnknownCategory { id: String },

    /// Product id does not resolve to a currently active product.
    #[error("Product not found or inactive: {id}")]
    UnknownProduct { id: String },

    /// Price is negative.
    #[error("Invalid price: {cents} cents")]
    InvalidPrice { cents: i64 },

    /// Quantity is zero, negative, or above the per-line ceiling.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Cart line index is out of range.
    #[error("No cart line at index {index}")]
    LineNotFound { index: usize },

    /// Finalize was requested on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has reached its maximum number of lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A shift is already open on this terminal.
    #[error("Shift {id} is already open")]
    ShiftAlreadyOpen { id: String },

    /// The operation requires an open shift and none is open.
    #[error("No open shift")]
    ShiftNotOpen,

    /// The operator's role does not permit the operation.
    #[error("Operator {operator} is not authorized to {action}")]
    Unauthorized { operator: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements, before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::DuplicateCategory {
            name: "Drinks".to_string(),
        };
        assert_eq!(err.to_string(), "Category 'Drinks' already exists");

        let err = CoreError::LineNotFound { index: 4 };
        assert_eq!(err.to_string(), "No cart line at index 4");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
