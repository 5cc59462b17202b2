//! # Shift Controller
//!
//! Authorization plus lifecycle orchestration around the core shift state
//! machine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Shift Controller Flow                                │
//! │                                                                         │
//! │  open_shift(session, 100.00)                                            │
//! │    ├── role may manage shifts? ── no ──► Unauthorized                   │
//! │    ├── opening cash ≥ 0?       ── no ──► Validation                     │
//! │    └── store: one-open-per-terminal guard + INSERT (transactional)      │
//! │                                                                         │
//! │  close_shift(session, 106.84)                                           │
//! │    ├── role may manage shifts? ── no ──► Unauthorized                   │
//! │    ├── open shift on terminal? ── no ──► ShiftNotOpen                   │
//! │    ├── core: variance = counted − expected, stamp + freeze              │
//! │    └── store: UPDATE ... WHERE status = 'open'                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;
use uuid::Uuid;

use crate::error::PosResult;
use crate::session::Session;
use till_core::validation::validate_cash_cents;
use till_core::{CoreError, Money, Shift};
use till_store::Database;

/// Opens, inspects, and closes shifts for one terminal.
#[derive(Debug, Clone)]
pub struct ShiftController {
    db: Database,
    terminal_id: String,
}

impl ShiftController {
    /// Creates a shift controller for a terminal.
    pub fn new(db: Database, terminal_id: impl Into<String>) -> Self {
        ShiftController {
            db,
            terminal_id: terminal_id.into(),
        }
    }

    /// Opens a shift with the counted opening float.
    ///
    /// ## Errors
    /// - `Unauthorized` if the operator's role may not manage shifts
    /// - `Validation` if the opening cash is negative
    /// - `ShiftAlreadyOpen` if the terminal already has an open shift
    pub async fn open_shift(&self, session: &Session, opening_cash: Money) -> PosResult<Shift> {
        self.authorize(session, "open a shift")?;
        validate_cash_cents("opening_cash", opening_cash.cents()).map_err(CoreError::from)?;

        let shift = Shift::open(
            Uuid::new_v4().to_string(),
            self.terminal_id.clone(),
            &session.operator,
            opening_cash,
            session.now(),
        );
        self.db.shifts().open_shift(&shift).await?;

        info!(
            shift_id = %shift.id,
            operator = %session.operator.name,
            opening_cash = %opening_cash,
            "Shift opened"
        );
        Ok(shift)
    }

    /// The open shift on this terminal, if any. Read-only.
    pub async fn current_shift(&self) -> PosResult<Option<Shift>> {
        Ok(self.db.shifts().current_open(&self.terminal_id).await?)
    }

    /// Closes the open shift, reconciling counted against expected cash.
    ///
    /// Returns the closed shift; its `variance_cents` is
    /// `counted − expected`.
    ///
    /// ## Errors
    /// - `Unauthorized` if the operator's role may not manage shifts
    /// - `Validation` if the counted cash is negative
    /// - `ShiftNotOpen` if the terminal has no open shift (including a
    ///   second close of the same shift)
    pub async fn close_shift(&self, session: &Session, counted_cash: Money) -> PosResult<Shift> {
        self.authorize(session, "close a shift")?;
        validate_cash_cents("counted_cash", counted_cash.cents()).map_err(CoreError::from)?;

        let mut shift = self
            .db
            .shifts()
            .current_open(&self.terminal_id)
            .await?
            .ok_or(CoreError::ShiftNotOpen)?;

        let variance = shift.close(&session.operator, counted_cash, session.now())?;
        self.db.shifts().close_shift(&shift).await?;

        info!(
            shift_id = %shift.id,
            operator = %session.operator.name,
            counted_cash = %counted_cash,
            variance = %variance,
            "Shift closed"
        );
        Ok(shift)
    }

    fn authorize(&self, session: &Session, action: &str) -> PosResult<()> {
        if !session.operator.role.can_manage_shifts() {
            return Err(CoreError::Unauthorized {
                operator: session.operator.name.clone(),
                action: action.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PosError;
    use till_core::{Operator, Role};
    use till_store::DbConfig;

    fn session(role: Role) -> Session {
        Session::new(Operator {
            id: "op-1".to_string(),
            name: "Alice".to_string(),
            role,
        })
    }

    async fn controller() -> ShiftController {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ShiftController::new(db, "till-01")
    }

    #[tokio::test]
    async fn test_open_and_close_round_trip() {
        let shifts = controller().await;
        let cashier = session(Role::Cashier);

        let shift = shifts
            .open_shift(&cashier, Money::from_cents(10_000))
            .await
            .unwrap();
        assert_eq!(shift.expected_cash_cents, 10_000);

        let closed = shifts
            .close_shift(&cashier, Money::from_cents(10_000))
            .await
            .unwrap();
        assert_eq!(closed.id, shift.id);
        assert_eq!(closed.variance_cents, Some(0));
        assert!(shifts.current_shift().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_trainee_cannot_manage_shifts() {
        let shifts = controller().await;
        let trainee = session(Role::Trainee);

        let err = shifts
            .open_shift(&trainee, Money::from_cents(10_000))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Unauthorized { .. })));

        // Even with a shift open (by a cashier), a trainee may not close it
        shifts
            .open_shift(&session(Role::Cashier), Money::from_cents(10_000))
            .await
            .unwrap();
        let err = shifts
            .close_shift(&trainee, Money::from_cents(10_000))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_double_open_rejected() {
        let shifts = controller().await;
        let cashier = session(Role::Cashier);

        shifts
            .open_shift(&cashier, Money::from_cents(5_000))
            .await
            .unwrap();
        let err = shifts
            .open_shift(&cashier, Money::from_cents(5_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PosError::Core(CoreError::ShiftAlreadyOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_close_without_open_rejected() {
        let shifts = controller().await;
        let manager = session(Role::Manager);

        let err = shifts
            .close_shift(&manager, Money::from_cents(0))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::ShiftNotOpen)));
    }

    #[tokio::test]
    async fn test_negative_opening_cash_rejected() {
        let shifts = controller().await;
        let cashier = session(Role::Cashier);

        let err = shifts
            .open_shift(&cashier, Money::from_cents(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));
    }
}
