//! # Terminal Error Type
//!
//! Unified error type for the terminal surface.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tillpoint                              │
//! │                                                                         │
//! │  Presentation                 Terminal Services                         │
//! │  ────────────                 ─────────────────                         │
//! │                                                                         │
//! │  checkout.finalize(&session)                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method: Result<T, PosError>                             │  │
//! │  │         │                                                        │  │
//! │  │         ├── Guard failed? ── CoreError ─────────► Core(..)       │  │
//! │  │         │     (EmptyCart, ShiftNotOpen, Unauthorized, ...)       │  │
//! │  │         │                                                        │  │
//! │  │         ├── Store guard? ── StoreError::Domain ─► Core(..)       │  │
//! │  │         │     (unwrapped: classification survives the tx)        │  │
//! │  │         │                                                        │  │
//! │  │         ├── Finalize write failed? ─────────────► FinalizeFailed │  │
//! │  │         │     (retryable; cart left intact)                      │  │
//! │  │         │                                                        │  │
//! │  │         └── Other store failure ────────────────► Store(..)      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::CoreError;
use till_store::StoreError;

/// Error surface of the terminal layer.
#[derive(Debug, Error)]
pub enum PosError {
    /// A business rule rejected the operation. Locally recoverable: the
    /// cashier corrects the input and retries.
    #[error(transparent)]
    Core(CoreError),

    /// The finalize transaction failed to persist. The cart is intact and
    /// the operation is retryable.
    #[error("Sale could not be finalized: {reason}")]
    FinalizeFailed { reason: String },

    /// A store failure outside the finalize path (connection, schema,
    /// unexpected query error).
    #[error(transparent)]
    Store(StoreError),

    /// Terminal configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for PosError {
    fn from(err: CoreError) -> Self {
        PosError::Core(err)
    }
}

/// Guard failures raised inside store transactions come back as
/// `StoreError::Domain`; unwrap them so callers match on `PosError::Core`
/// regardless of which layer raised the rule.
impl From<StoreError> for PosError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(core) => PosError::Core(core),
            other => PosError::Store(other),
        }
    }
}

/// Result type for terminal operations.
pub type PosResult<T> = Result<T, PosError>;

// =============================================================================
// Unit Tests
// =============================================================================
