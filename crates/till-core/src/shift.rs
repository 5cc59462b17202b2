//! # Shift State Machine
//!
//! A shift is a bounded operating session on a terminal. All sales activity
//! is gated behind an open shift, and the shift reconciles cash at close.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shift Lifecycle                                  │
//! │                                                                         │
//! │  open_shift(operator, opening_cash)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌────────┐  record_sale(total)   expected_cash += total               │
//! │  │  OPEN  │◄────────────────────  (once per finalized sale)            │
//! │  └───┬────┘                                                             │
//! │      │ close_shift(operator, counted_cash)                             │
//! │      ▼                                                                  │
//! │  ┌────────┐  variance = counted_cash − expected_cash                   │
//! │  │ CLOSED │  record frozen, consumed by external reporting             │
//! │  └────────┘                                                             │
//! │                                                                         │
//! │  Exactly one OPEN shift per terminal at any time.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transitions here are pure; the store layer persists them and the
//! terminal's `ShiftController` enforces authorization and the
//! one-open-shift-per-terminal guard transactionally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Operator;

// =============================================================================
// Shift Status
// =============================================================================

/// The status of a shift.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Shift is open; sales may be finalized.
    Open,
    /// Shift is closed and frozen. Initial and terminal state.
    Closed,
}

// =============================================================================
// Shift
// =============================================================================

/// A bounded operating session on a terminal.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Terminal this shift belongs to.
    pub terminal_id: String,

    /// Operator who opened the shift.
    pub opened_by: String,

    /// When the shift was opened.
    pub opened_at: DateTime<Utc>,

    /// Cash in the drawer at open.
    pub opening_cash_cents: i64,

    /// Current status.
    pub status: ShiftStatus,

    /// Running total of cash expected in the drawer:
    /// opening cash plus every finalized sale's grand total.
    pub expected_cash_cents: i64,

    /// Operator who closed the shift. `None` while open.
    pub closed_by: Option<String>,

    /// When the shift was closed. `None` while open.
    pub closed_at: Option<DateTime<Utc>>,

    /// Physically counted cash at close. `None` while open.
    pub counted_cash_cents: Option<i64>,

    /// counted − expected, set at close. `None` while open.
    pub variance_cents: Option<i64>,
}

impl Shift {
    /// Opens a new shift with the drawer's opening cash.
    ///
    /// Authorization and the one-open-shift guard are the controller's
    /// responsibility; this constructor only establishes the initial state.
    pub fn open(
        id: String,
        terminal_id: String,
        opened_by: &Operator,
        opening_cash: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Shift {
            id,
            terminal_id,
            opened_by: opened_by.id.clone(),
            opened_at: now,
            opening_cash_cents: opening_cash.cents(),
            status: ShiftStatus::Open,
            expected_cash_cents: opening_cash.cents(),
            closed_by: None,
            closed_at: None,
            counted_cash_cents: None,
            variance_cents: None,
        }
    }

    /// Whether the shift is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// Expected cash as Money.
    #[inline]
    pub fn expected_cash(&self) -> Money {
        Money::from_cents(self.expected_cash_cents)
    }

    /// Records a finalized sale against this shift.
    ///
    /// Called once per finalized sale with the sale's grand total (treated
    /// as a cash-equivalent amount).
    ///
    /// ## Errors
    /// `ShiftNotOpen` if the shift is closed. Defensive: the checkout's own
    /// open-shift guard should make this unreachable.
    pub fn record_sale(&mut self, amount: Money) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::ShiftNotOpen);
        }
        self.expected_cash_cents += amount.cents();
        Ok(())
    }

    /// Closes the shift, reconciling counted against expected cash.
    ///
    /// Computes `variance = counted_cash − expected_cash`, stamps
    /// `closed_by`/`closed_at`, and freezes the record. Returns the
    /// variance.
    ///
    /// ## Errors
    /// `ShiftNotOpen` if the shift is already closed - closing twice fails
    /// the second time.
    pub fn close(
        &mut self,
        closed_by: &Operator,
        counted_cash: Money,
        now: DateTime<Utc>,
    ) -> CoreResult<Money> {
        if !self.is_open() {
            return Err(CoreError::ShiftNotOpen);
        }

        let variance = counted_cash - self.expected_cash();

        self.status = ShiftStatus::Closed;
        self.closed_by = Some(closed_by.id.clone());
        self.closed_at = Some(now);
        self.counted_cash_cents = Some(counted_cash.cents());
        self.variance_cents = Some(variance.cents());

        Ok(variance)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
