//! # Store Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← adds context and categorization            │
//! │       │     also carries Domain(CoreError) for guard failures          │
//! │       │     raised INSIDE a transaction (duplicate name, in-use        │
//! │       │     category, no open shift)                                   │
//! │       ▼                                                                 │
//! │  PosError (till-terminal) ← the classified surface the UI sees         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::CoreError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context. Guard
/// checks that must run atomically with their mutation (duplicate category
/// name, category-in-use, one-open-shift) surface through the `Domain`
/// variant so the failure classification survives the transaction boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business-rule guard failed inside a transactional unit of work.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (database-level backstop for the
    /// in-transaction duplicate checks).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema bootstrap failed.
    #[error("Schema bootstrap failed: {0}")]
    SchemaFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type StoreResult<T> = Result<T, StoreError>;
