//! # Schema Bootstrap
//!
//! Embedded SQL schema applied at startup.
//!
//! Every statement is idempotent (`IF NOT EXISTS`), so bootstrap is safe to
//! run on every connect. The CHECK/UNIQUE constraints here are a backstop:
//! the real guards (duplicate names, category-in-use, one open shift) run
//! as explicit checks inside the repository transactions, so callers get a
//! classified domain error instead of a raw constraint violation.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Schema statements, applied in order. Referenced tables come first.
const SCHEMA: &[&str] = &[
    // -- Catalog ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        is_active   INTEGER NOT NULL DEFAULT 1,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    // Name uniqueness applies only among ACTIVE categories: an inactive
    // "Drinks" may coexist with a new active "Drinks" (and is reactivated
    // instead when re-added).
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_active_name
        ON categories (lower(trim(name)))
        WHERE is_active = 1
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id           TEXT PRIMARY KEY,
        name         TEXT NOT NULL,
        category_id  TEXT NOT NULL REFERENCES categories (id),
        price_cents  INTEGER NOT NULL CHECK (price_cents >= 0),
        stock        INTEGER,
        is_active    INTEGER NOT NULL DEFAULT 1,
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_products_category
        ON products (category_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tax_rules (
        category_id  TEXT PRIMARY KEY REFERENCES categories (id),
        rate_bps     INTEGER NOT NULL CHECK (rate_bps BETWEEN 0 AND 10000),
        updated_at   TEXT NOT NULL
    )
    "#,
    // -- Shifts -------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS shifts (
        id                  TEXT PRIMARY KEY,
        terminal_id         TEXT NOT NULL,
        opened_by           TEXT NOT NULL,
        opened_at           TEXT NOT NULL,
        opening_cash_cents  INTEGER NOT NULL CHECK (opening_cash_cents >= 0),
        status              TEXT NOT NULL CHECK (status IN ('open', 'closed')),
        expected_cash_cents INTEGER NOT NULL,
        closed_by           TEXT,
        closed_at           TEXT,
        counted_cash_cents  INTEGER,
        variance_cents      INTEGER
    )
    "#,
    // Exactly one open shift per terminal.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_shifts_open
        ON shifts (terminal_id)
        WHERE status = 'open'
    "#,
    // -- Sales --------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id              TEXT PRIMARY KEY,
        shift_id        TEXT NOT NULL REFERENCES shifts (id),
        terminal_id     TEXT NOT NULL,
        operator_id     TEXT NOT NULL,
        receipt_number  TEXT NOT NULL,
        subtotal_cents  INTEGER NOT NULL,
        tax_cents       INTEGER NOT NULL,
        total_cents     INTEGER NOT NULL,
        created_at      TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_sales_shift
        ON sales (shift_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sale_lines (
        id                  TEXT PRIMARY KEY,
        sale_id             TEXT NOT NULL REFERENCES sales (id),
        product_id          TEXT NOT NULL REFERENCES products (id),
        name_snapshot       TEXT NOT NULL,
        unit_price_cents    INTEGER NOT NULL,
        tax_rate_bps        INTEGER NOT NULL,
        quantity            INTEGER NOT NULL CHECK (quantity > 0),
        line_subtotal_cents INTEGER NOT NULL,
        line_tax_cents      INTEGER NOT NULL,
        line_total_cents    INTEGER NOT NULL,
        created_at          TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_sale_lines_sale
        ON sale_lines (sale_id)
    "#,
];

/// Applies the embedded schema.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Ordered: referenced tables are created before their referrers
pub async fn bootstrap(pool: &SqlitePool) -> StoreResult<()> {
    info!("Applying database schema");

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;
    }

    info!("Schema up to date");
    Ok(())
}
