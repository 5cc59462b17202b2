//! # Catalog Repository
//!
//! Database operations for categories, products, and tax rules.
//!
//! ## Guarded Mutations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             Guard + Mutation = One Transaction                          │
//! │                                                                         │
//! │  add_category("Drinks")                                                 │
//! │    BEGIN                                                                │
//! │    ├── active duplicate?  ──► yes ──► ROLLBACK, DuplicateCategory       │
//! │    ├── inactive same name? ─► yes ──► reactivate that row               │
//! │    └── INSERT new row                                                   │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  deactivate_category(id)                                                │
//! │    BEGIN                                                                │
//! │    ├── row exists?        ──► no ───► ROLLBACK, UnknownCategory         │
//! │    ├── active products?   ──► yes ──► ROLLBACK, CategoryInUse           │
//! │    └── UPDATE is_active = 0                                             │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  No other operation can observe a half-applied state: the check and    │
//! │  the write are indivisible.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use till_core::validation::normalize_name;
use till_core::{Category, CoreError, Product, TaxRate, TaxRule};

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Adds a category, or reactivates an inactive one of the same name.
    ///
    /// ## Errors
    /// `CoreError::DuplicateCategory` (via `StoreError::Domain`) if an
    /// active category with the same normalized name already exists.
    pub async fn add_category(&self, name: &str) -> StoreResult<Category> {
        let normalized = normalize_name(name);
        debug!(name = %name, "Adding category");

        let mut tx = self.pool.begin().await?;

        // Duplicate guard: active categories only
        let duplicate: Option<String> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE lower(trim(name)) = ?1 AND is_active = 1",
        )
        .bind(&normalized)
        .fetch_optional(&mut *tx)
        .await?;

        if duplicate.is_some() {
            return Err(CoreError::DuplicateCategory {
                name: name.trim().to_string(),
            }
            .into());
        }

        let now = Utc::now();

        // Re-adding a retired name reactivates the existing row, keeping
        // historical product references pointed at the same id
        let retired: Option<String> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE lower(trim(name)) = ?1 AND is_active = 0 LIMIT 1",
        )
        .bind(&normalized)
        .fetch_optional(&mut *tx)
        .await?;

        let category = if let Some(id) = retired {
            debug!(id = %id, "Reactivating retired category");
            sqlx::query("UPDATE categories SET is_active = 1, updated_at = ?2 WHERE id = ?1")
                .bind(&id)
                .bind(now)
                .execute(&mut *tx)
                .await?;

            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
                .bind(&id)
                .fetch_one(&mut *tx)
                .await?
        } else {
            let category = Category {
                id: Uuid::new_v4().to_string(),
                name: name.trim().to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO categories (id, name, is_active, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.is_active)
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&mut *tx)
            .await?;

            category
        };

        tx.commit().await?;
        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get_category(&self, id: &str) -> StoreResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    /// Deactivates a category (soft delete).
    ///
    /// ## Errors
    /// - `CoreError::UnknownCategory` if the id does not exist
    /// - `CoreError::CategoryInUse` if any active product references it
    pub async fn deactivate_category(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deactivating category");

        let mut tx = self.pool.begin().await?;

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Err(CoreError::UnknownCategory { id: id.to_string() }.into());
        }

        // Usage guard: a category still referenced by an active product
        // must stay active so that product remains sellable
        let in_use: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if in_use > 0 {
            return Err(CoreError::CategoryInUse { id: id.to_string() }.into());
        }

        sqlx::query("UPDATE categories SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Lists categories in insertion order.
    pub async fn list_categories(&self, active_only: bool) -> StoreResult<Vec<Category>> {
        let sql = if active_only {
            "SELECT * FROM categories WHERE is_active = 1 ORDER BY created_at, id"
        } else {
            "SELECT * FROM categories ORDER BY created_at, id"
        };

        let categories = sqlx::query_as::<_, Category>(sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Adds a product to an active category.
    ///
    /// ## Errors
    /// `CoreError::UnknownCategory` if the category is missing or inactive.
    /// (Price validation happens in the service layer before this call; the
    /// CHECK constraint is the backstop.)
    pub async fn add_product(
        &self,
        name: &str,
        category_id: &str,
        price_cents: i64,
        stock: Option<i64>,
    ) -> StoreResult<Product> {
        debug!(name = %name, category_id = %category_id, price_cents, "Adding product");

        let mut tx = self.pool.begin().await?;

        // The category must be active at creation time
        let category_active: Option<String> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE id = ?1 AND is_active = 1",
        )
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await?;

        if category_active.is_none() {
            return Err(CoreError::UnknownCategory {
                id: category_id.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            category_id: category_id.to_string(),
            price_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, price_cents, stock, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Gets a product by ID (any active state).
    pub async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product by ID.
    ///
    /// The cart engine sells from this lookup: inactive products are
    /// invisible to it, while historical sale lines keep their reference.
    pub async fn get_active_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(product)
    }

    /// Deactivates a product (soft delete).
    ///
    /// No usage guard: a deactivated product may still be referenced by
    /// historical sale lines, which is expected and desired.
    ///
    /// ## Errors
    /// `CoreError::UnknownProduct` if the id does not exist.
    pub async fn deactivate_product(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::UnknownProduct { id: id.to_string() }.into());
        }

        Ok(())
    }

    /// Updates a product's price.
    ///
    /// Lines already in a cart keep their snapshot; only future `add_line`
    /// calls see the new price.
    ///
    /// ## Errors
    /// `CoreError::UnknownProduct` if the id does not resolve to an active
    /// product.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> StoreResult<()> {
        debug!(id = %id, price_cents, "Updating product price");

        let result = sqlx::query(
            "UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(price_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::UnknownProduct { id: id.to_string() }.into());
        }

        Ok(())
    }

    /// Lists products in insertion order, optionally filtered by category
    /// and active flag.
    pub async fn list_products(
        &self,
        category_id: Option<&str>,
        active_only: bool,
    ) -> StoreResult<Vec<Product>> {
        let products = match (category_id, active_only) {
            (Some(cat), true) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE category_id = ?1 AND is_active = 1 ORDER BY created_at, id",
                )
                .bind(cat)
                .fetch_all(&self.pool)
                .await?
            }
            (Some(cat), false) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE category_id = ?1 ORDER BY created_at, id",
                )
                .bind(cat)
                .fetch_all(&self.pool)
                .await?
            }
            (None, true) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE is_active = 1 ORDER BY created_at, id",
                )
                .fetch_all(&self.pool)
                .await?
            }
            (None, false) => {
                sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at, id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(products)
    }

    // =========================================================================
    // Tax Rules
    // =========================================================================

    /// Sets (upserts) the tax rate override for a category.
    ///
    /// At most one effective rate per category at a time: the primary key
    /// on `category_id` makes the upsert replace any previous rate.
    ///
    /// ## Errors
    /// `CoreError::UnknownCategory` if the category is missing or inactive.
    pub async fn set_tax_rate(&self, category_id: &str, rate_bps: u32) -> StoreResult<TaxRule> {
        debug!(category_id = %category_id, rate_bps, "Setting tax rate");

        let mut tx = self.pool.begin().await?;

        let category_active: Option<String> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE id = ?1 AND is_active = 1",
        )
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await?;

        if category_active.is_none() {
            return Err(CoreError::UnknownCategory {
                id: category_id.to_string(),
            }
            .into());
        }

        let rule = TaxRule {
            category_id: category_id.to_string(),
            rate_bps,
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO tax_rules (category_id, rate_bps, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (category_id)
            DO UPDATE SET rate_bps = excluded.rate_bps, updated_at = excluded.updated_at
            "#,
        )
        .bind(&rule.category_id)
        .bind(rule.rate_bps)
        .bind(rule.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rule)
    }

    /// Resolves the tax rate override for a category, if any.
    ///
    /// Read fresh on every cart mutation - never cached - so a rate update
    /// is visible to the very next `add_line`.
    pub async fn tax_rate_for(&self, category_id: &str) -> StoreResult<Option<TaxRate>> {
        let rate_bps: Option<u32> =
            sqlx::query_scalar("SELECT rate_bps FROM tax_rules WHERE category_id = ?1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(rate_bps.map(TaxRate::from_bps))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
