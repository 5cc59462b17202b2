//! # Sale Repository
//!
//! Persistence for finalized sales.
//!
//! ## Finalize Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                record_sale: one transaction                             │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │  ├── INSERT sale header                                                 │
//! │  ├── INSERT every sale line (snapshots, per-line totals)                │
//! │  ├── UPDATE shifts SET expected_cash += total                           │
//! │  │        WHERE id = ? AND status = 'open'                              │
//! │  │        └── 0 rows ──► ROLLBACK, ShiftNotOpen                         │
//! │  └── UPDATE products SET stock -= qty   (tracked products only)         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either the sale, its lines, the drawer increment, and the stock        │
//! │  decrements all land, or none of them do. The caller's cart is          │
//! │  untouched either way; the service layer clears it only on Ok.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreResult;
use till_core::{CoreError, Sale, SaleLine};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a finalized sale: header, lines, drawer increment, and
    /// stock decrements in a single transaction.
    ///
    /// ## Errors
    /// `CoreError::ShiftNotOpen` (via `StoreError::Domain`) if the shift
    /// closed between checkout starting and this write. Nothing is
    /// persisted in that case.
    pub async fn record_sale(&self, sale: &Sale, lines: &[SaleLine]) -> StoreResult<()> {
        debug!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total_cents = sale.total_cents,
            line_count = lines.len(),
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, shift_id, terminal_id, operator_id, receipt_number,
                subtotal_cents, tax_cents, total_cents, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.shift_id)
        .bind(&sale.terminal_id)
        .bind(&sale.operator_id)
        .bind(&sale.receipt_number)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (
                    id, sale_id, product_id, name_snapshot, unit_price_cents,
                    tax_rate_bps, quantity, line_subtotal_cents,
                    line_tax_cents, line_total_cents, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&line.id)
            .bind(&line.sale_id)
            .bind(&line.product_id)
            .bind(&line.name_snapshot)
            .bind(line.unit_price_cents)
            .bind(line.tax_rate_bps)
            .bind(line.quantity)
            .bind(line.line_subtotal_cents)
            .bind(line.line_tax_cents)
            .bind(line.line_total_cents)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // Drawer increment doubles as the open-shift check: if the shift
        // closed underneath us, zero rows match and the whole sale rolls back
        let drawer = sqlx::query(
            r#"
            UPDATE shifts
            SET expected_cash_cents = expected_cash_cents + ?2
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(&sale.shift_id)
        .bind(sale.total_cents)
        .execute(&mut *tx)
        .await?;

        if drawer.rows_affected() == 0 {
            return Err(CoreError::ShiftNotOpen.into());
        }

        // Stock only moves for tracked products; untracked stay NULL
        for line in lines {
            sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2
                WHERE id = ?1 AND stock IS NOT NULL
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total_cents = sale.total_cents,
            "Sale recorded"
        );
        Ok(())
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets the lines of a sale in the order they were rung up.
    pub async fn get_lines(&self, sale_id: &str) -> StoreResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT * FROM sale_lines WHERE sale_id = ?1 ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists sales recorded under a shift, oldest first.
    pub async fn list_for_shift(&self, shift_id: &str) -> StoreResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE shift_id = ?1 ORDER BY created_at, id",
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
