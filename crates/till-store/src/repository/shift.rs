//! # Shift Repository
//!
//! Persistence for the shift lifecycle.
//!
//! The state machine itself (open → record sales → close) lives in
//! `till_core::shift`; this repository enforces the one-open-shift-per-
//! terminal rule transactionally and persists the transitions.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreResult;
use till_core::{CoreError, Shift};

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Persists a newly opened shift.
    ///
    /// The check and the insert share a transaction; the partial unique
    /// index on `(terminal_id) WHERE status = 'open'` backstops it.
    ///
    /// ## Errors
    /// `CoreError::ShiftAlreadyOpen` (via `StoreError::Domain`) if the
    /// terminal already has an open shift.
    pub async fn open_shift(&self, shift: &Shift) -> StoreResult<()> {
        debug!(shift_id = %shift.id, terminal_id = %shift.terminal_id, "Opening shift");

        let mut tx = self.pool.begin().await?;

        let already_open: Option<String> = sqlx::query_scalar(
            "SELECT id FROM shifts WHERE terminal_id = ?1 AND status = 'open'",
        )
        .bind(&shift.terminal_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(open_id) = already_open {
            return Err(CoreError::ShiftAlreadyOpen { id: open_id }.into());
        }

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, terminal_id, opened_by, opened_at, opening_cash_cents,
                status, expected_cash_cents, closed_by, closed_at,
                counted_cash_cents, variance_cents
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.terminal_id)
        .bind(&shift.opened_by)
        .bind(shift.opened_at)
        .bind(shift.opening_cash_cents)
        .bind(shift.status)
        .bind(shift.expected_cash_cents)
        .bind(&shift.closed_by)
        .bind(shift.closed_at)
        .bind(shift.counted_cash_cents)
        .bind(shift.variance_cents)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            shift_id = %shift.id,
            opening_cash_cents = shift.opening_cash_cents,
            "Shift opened"
        );
        Ok(())
    }

    /// Returns the open shift for a terminal, if any.
    pub async fn current_open(&self, terminal_id: &str) -> StoreResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            "SELECT * FROM shifts WHERE terminal_id = ?1 AND status = 'open'",
        )
        .bind(terminal_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Gets a shift by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>("SELECT * FROM shifts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shift)
    }

    /// Persists a closed shift's reconciliation fields.
    ///
    /// The `status = 'open'` predicate makes close-once atomic: a second
    /// close (or a close racing with another terminal process) affects
    /// zero rows and reports `ShiftNotOpen`.
    pub async fn close_shift(&self, shift: &Shift) -> StoreResult<()> {
        debug!(shift_id = %shift.id, "Closing shift");

        let result = sqlx::query(
            r#"
            UPDATE shifts
            SET status = ?2,
                closed_by = ?3,
                closed_at = ?4,
                counted_cash_cents = ?5,
                variance_cents = ?6
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(&shift.id)
        .bind(shift.status)
        .bind(&shift.closed_by)
        .bind(shift.closed_at)
        .bind(shift.counted_cash_cents)
        .bind(shift.variance_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ShiftNotOpen.into());
        }

        info!(
            shift_id = %shift.id,
            variance_cents = shift.variance_cents,
            "Shift closed"
        );
        Ok(())
    }

    /// Lists shifts for a terminal, newest first.
    pub async fn list_for_terminal(&self, terminal_id: &str) -> StoreResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(
            "SELECT * FROM shifts WHERE terminal_id = ?1 ORDER BY opened_at DESC, id",
        )
        .bind(terminal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use till_core::{Money, Operator, Role};

    fn cashier() -> Operator {
        Operator {
            id: "op-1".to_string(),
            name: "Alice".to_string(),
            role: Role::Cashier,
        }
    }

    fn open_test_shift(terminal: &str) -> Shift {
        Shift::open(
            uuid::Uuid::new_v4().to_string(),
            terminal.to_string(),
            &cashier(),
            Money::from_cents(10_000),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_open_and_fetch_shift() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shifts = db.shifts();

        let shift = open_test_shift("term-1");
        shifts.open_shift(&shift).await.unwrap();

        let current = shifts.current_open("term-1").await.unwrap().unwrap();
        assert_eq!(current.id, shift.id);
        assert_eq!(current.expected_cash_cents, 10_000);
        assert!(current.is_open());
    }

    #[tokio::test]
    async fn test_second_open_on_same_terminal_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shifts = db.shifts();

        shifts.open_shift(&open_test_shift("term-1")).await.unwrap();
        let err = shifts
            .open_shift(&open_test_shift("term-1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Domain(CoreError::ShiftAlreadyOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_different_terminals_open_independently() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shifts = db.shifts();

        shifts.open_shift(&open_test_shift("term-1")).await.unwrap();
        shifts.open_shift(&open_test_shift("term-2")).await.unwrap();

        assert!(shifts.current_open("term-1").await.unwrap().is_some());
        assert!(shifts.current_open("term-2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_close_shift_persists_reconciliation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shifts = db.shifts();

        let mut shift = open_test_shift("term-1");
        shifts.open_shift(&shift).await.unwrap();

        let variance = shift
            .close(&cashier(), Money::from_cents(9_950), Utc::now())
            .unwrap();
        assert_eq!(variance.cents(), -50);

        shifts.close_shift(&shift).await.unwrap();

        assert!(shifts.current_open("term-1").await.unwrap().is_none());
        let stored = shifts.get_by_id(&shift.id).await.unwrap().unwrap();
        assert_eq!(stored.counted_cash_cents, Some(9_950));
        assert_eq!(stored.variance_cents, Some(-50));
    }

    #[tokio::test]
    async fn test_close_twice_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shifts = db.shifts();

        let mut shift = open_test_shift("term-1");
        shifts.open_shift(&shift).await.unwrap();
        shift
            .close(&cashier(), Money::from_cents(10_000), Utc::now())
            .unwrap();
        shifts.close_shift(&shift).await.unwrap();

        let err = shifts.close_shift(&shift).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(CoreError::ShiftNotOpen)));
    }

    #[tokio::test]
    async fn test_reopen_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shifts = db.shifts();

        let mut first = open_test_shift("term-1");
        shifts.open_shift(&first).await.unwrap();
        first
            .close(&cashier(), Money::from_cents(10_000), Utc::now())
            .unwrap();
        shifts.close_shift(&first).await.unwrap();

        // A fresh shift on the same terminal is fine once the old one closed
        let second = open_test_shift("term-1");
        shifts.open_shift(&second).await.unwrap();

        let history = shifts.list_for_terminal("term-1").await.unwrap();
        assert_eq!(history.len(), 2);
    }
}
