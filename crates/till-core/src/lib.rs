//! # till-core: Pure Business Logic for Tillpoint
//!
//! This crate is the **heart** of Tillpoint, a retail point-of-sale
//! transaction core. It contains all business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tillpoint Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation layer (external)                   │   │
//! │  │      catalog screens ──► cart UI ──► shift open/close UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 till-terminal (session layer)                   │   │
//! │  │   CatalogService, CartSession, ShiftController, Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   shift   │  │   │
//! │  │   │ Category  │  │   Money   │  │   Cart    │  │   Shift   │  │   │
//! │  │   │  Product  │  │  TaxRate  │  │ CartLine  │  │ lifecycle │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 till-store (Database Layer)                     │   │
//! │  │            SQLite queries, schema, repositories                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, Sale, Operator, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart engine: line accumulation and total recomputation
//! - [`tax`] - Tax rate resolution (per-category override or default)
//! - [`shift`] - The shift state machine (open → closed, cash reconciliation)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//! use till_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(200); // $2.00
//!
//! // Per-line tax, rounded half up at the line
//! let rate = TaxRate::from_bps(1400); // 14%
//! let tax = price.multiply_quantity(3).calculate_tax(rate);
//! assert_eq!(tax.cents(), 84); // $6.00 × 14% = $0.84
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod shift;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use shift::{Shift, ShiftStatus};
pub use tax::TaxPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
