//! # Checkout
//!
//! Turns the in-progress cart into an immutable, persisted sale.
//!
//! ## Finalize Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      finalize(session)                                  │
//! │                                                                         │
//! │  1. snapshot cart        ── empty? ──────────► EmptyCart                │
//! │  2. open shift lookup    ── none? ───────────► ShiftNotOpen             │
//! │  3. build Sale + SaleLines (deep copies of the cart lines, receipt     │
//! │     number stamped from the session clock)                              │
//! │  4. record_sale          ── store failure? ──► FinalizeFailed           │
//! │        one transaction:                        (cart left intact,       │
//! │        sale + lines + drawer + stock            retryable)              │
//! │  5. clear cart, return the persisted Sale                               │
//! │                                                                         │
//! │  The cart is only cleared AFTER the transaction commits; any failure    │
//! │  leaves it exactly as the cashier built it.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cart::CartSession;
use crate::error::{PosError, PosResult};
use crate::session::Session;
use till_core::{Cart, CoreError, Sale, SaleLine};
use till_store::{Database, StoreError};

/// Finalizes carts into sales for one terminal.
#[derive(Debug, Clone)]
pub struct Checkout {
    db: Database,
    cart: CartSession,
    terminal_id: String,
    /// Per-process receipt sequence; combined with the second-resolution
    /// timestamp this keeps receipt numbers unique and human-sortable.
    sequence: Arc<AtomicU32>,
}

impl Checkout {
    /// Creates a checkout bound to a terminal's cart session.
    pub fn new(db: Database, cart: CartSession, terminal_id: impl Into<String>) -> Self {
        Checkout {
            db,
            cart,
            terminal_id: terminal_id.into(),
            sequence: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Finalizes the current cart into a persisted sale.
    ///
    /// ## Errors
    /// - `EmptyCart` if the cart has no lines (checked before persistence)
    /// - `ShiftNotOpen` if the terminal has no open shift
    /// - `FinalizeFailed` if the store transaction fails; nothing is
    ///   persisted and the cart is left intact for retry
    pub async fn finalize(&self, session: &Session) -> PosResult<Sale> {
        let snapshot = self.cart.snapshot();
        if snapshot.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let shift = self
            .db
            .shifts()
            .current_open(&self.terminal_id)
            .await?
            .ok_or(CoreError::ShiftNotOpen)?;

        let now = session.now();
        let (sale, lines) = self.build_sale(&snapshot, &shift.id, &session.operator.id, now);

        self.db
            .sales()
            .record_sale(&sale, &lines)
            .await
            .map_err(|err| match err {
                // Guard classification survives; everything else is a
                // retryable finalize failure
                StoreError::Domain(core) => {
                    warn!(receipt = %sale.receipt_number, error = %core, "Finalize rejected");
                    PosError::Core(core)
                }
                other => {
                    warn!(receipt = %sale.receipt_number, error = %other, "Finalize failed");
                    PosError::FinalizeFailed {
                        reason: other.to_string(),
                    }
                }
            })?;

        self.cart.with_cart_mut(Cart::clear);

        info!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total_cents = sale.total_cents,
            operator = %session.operator.name,
            "Sale finalized"
        );
        Ok(sale)
    }

    /// Builds the immutable sale and its deep-copied lines from a cart
    /// snapshot.
    fn build_sale(
        &self,
        cart: &Cart,
        shift_id: &str,
        operator_id: &str,
        now: DateTime<Utc>,
    ) -> (Sale, Vec<SaleLine>) {
        let sale_id = Uuid::new_v4().to_string();
        let sale = Sale {
            id: sale_id.clone(),
            shift_id: shift_id.to_string(),
            terminal_id: self.terminal_id.clone(),
            operator_id: operator_id.to_string(),
            receipt_number: self.next_receipt_number(now),
            subtotal_cents: cart.subtotal_cents(),
            tax_cents: cart.tax_cents(),
            total_cents: cart.total_cents(),
            created_at: now,
        };

        let lines = cart
            .lines
            .iter()
            .map(|line| SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                tax_rate_bps: line.tax_rate_bps,
                quantity: line.quantity,
                line_subtotal_cents: line.line_subtotal_cents(),
                line_tax_cents: line.line_tax_cents(),
                line_total_cents: line.line_total_cents(),
                created_at: now,
            })
            .collect();

        (sale, lines)
    }

    /// Receipt numbers: `YYMMDD-HHMMSS-NNNN`.
    fn next_receipt_number(&self, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) % 10_000 + 1;
        format!("{}-{:04}", now.format("%y%m%d-%H%M%S"), seq)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
