//! # Catalog Service
//!
//! The terminal's catalog management surface: validates input, then
//! delegates to the store's transactional guards.
//!
//! ## Division of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogService (here)            CatalogRepository (till-store)        │
//! │  ─────────────────────            ──────────────────────────────        │
//! │  name length / emptiness          duplicate-name check (in tx)          │
//! │  price ≥ 0                        category-in-use check (in tx)         │
//! │  rate ≤ 100%                      reactivation of retired names         │
//! │                                   soft-delete flips                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::PosResult;
use till_core::validation::{
    validate_category_name, validate_product_name, validate_tax_rate_bps,
};
use till_core::{Category, CoreError, Product, TaxRule};
use till_store::Database;

/// Catalog management operations.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    /// Adds a category (or revives a retired one of the same name).
    pub async fn add_category(&self, name: &str) -> PosResult<Category> {
        let trimmed = validate_category_name(name).map_err(CoreError::from)?;
        let category = self.db.catalog().add_category(&trimmed).await?;
        info!(category_id = %category.id, name = %category.name, "Category added");
        Ok(category)
    }

    /// Deactivates a category. Fails while active products reference it.
    pub async fn remove_category(&self, id: &str) -> PosResult<()> {
        self.db.catalog().deactivate_category(id).await?;
        info!(category_id = %id, "Category deactivated");
        Ok(())
    }

    /// Lists active categories.
    pub async fn list_categories(&self) -> PosResult<Vec<Category>> {
        Ok(self.db.catalog().list_categories(true).await?)
    }

    /// Adds a product under an active category.
    pub async fn add_product(
        &self,
        name: &str,
        category_id: &str,
        price_cents: i64,
        stock: Option<i64>,
    ) -> PosResult<Product> {
        let trimmed = validate_product_name(name).map_err(CoreError::from)?;
        if price_cents < 0 {
            return Err(CoreError::InvalidPrice { cents: price_cents }.into());
        }

        let product = self
            .db
            .catalog()
            .add_product(&trimmed, category_id, price_cents, stock)
            .await?;
        info!(product_id = %product.id, name = %product.name, "Product added");
        Ok(product)
    }

    /// Deactivates a product. Historical sale lines keep referencing it.
    pub async fn remove_product(&self, id: &str) -> PosResult<()> {
        self.db.catalog().deactivate_product(id).await?;
        info!(product_id = %id, "Product deactivated");
        Ok(())
    }

    /// Changes a product's price. Lines already in a cart keep their
    /// snapshot.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> PosResult<()> {
        if price_cents < 0 {
            return Err(CoreError::InvalidPrice { cents: price_cents }.into());
        }
        self.db.catalog().update_price(id, price_cents).await?;
        info!(product_id = %id, price_cents, "Price updated");
        Ok(())
    }

    /// Lists active products, optionally restricted to a category.
    pub async fn list_products(&self, category_id: Option<&str>) -> PosResult<Vec<Product>> {
        Ok(self.db.catalog().list_products(category_id, true).await?)
    }

    /// Sets the tax rate override for a category.
    pub async fn set_tax_rate(&self, category_id: &str, rate_bps: u32) -> PosResult<TaxRule> {
        validate_tax_rate_bps(rate_bps).map_err(CoreError::from)?;
        let rule = self.db.catalog().set_tax_rate(category_id, rate_bps).await?;
        info!(category_id = %category_id, rate_bps, "Tax rate set");
        Ok(rule)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
