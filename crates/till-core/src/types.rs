//! # Domain Types
//!
//! Core domain types used throughout Tillpoint.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │     Product     │   │    TaxRule      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──┤  category_id    │   │  category_id    │       │
//! │  │  name (unique   │   │  price_cents    │   │  rate_bps       │       │
//! │  │   among active) │   │  stock?         │   │  (≤1 per cat.)  │       │
//! │  │  is_active      │   │  is_active      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │    SaleLine     │   │    Operator     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, shift_id   │◄──┤  sale_id        │   │  id, name       │       │
//! │  │  totals (cents) │   │  snapshots      │   │  role           │       │
//! │  │  immutable      │   │  immutable      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft-Delete Pattern
//! Categories and products carry an `is_active` flag instead of ever being
//! hard-deleted. Historical sale lines keep referencing retired products,
//! so referential history stays valid forever.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1400 bps = 14% (e.g., a typical VAT rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Operator & Role
// =============================================================================

/// Operator role, ordered by privilege.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May ring items into a cart under supervision; may not open or
    /// close shifts.
    Trainee,
    /// Regular till operator.
    Cashier,
    /// Store management.
    Manager,
}

impl Role {
    /// Whether this role may open and close shifts.
    #[inline]
    pub const fn can_manage_shifts(&self) -> bool {
        matches!(self, Role::Cashier | Role::Manager)
    }
}

/// The person operating the terminal.
///
/// Identity resolution (login, password verification) happens outside the
/// core; the core only needs `{id, role}` for authorization checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name for receipts and shift records.
    pub name: String,

    /// Role driving authorization checks.
    pub role: Role,
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
///
/// ## Lifecycle
/// Created active; deactivated (soft-deleted) only when no active product
/// references it; re-adding the same name while inactive reactivates the
/// existing row instead of inserting a duplicate.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique among active categories (case-insensitive,
    /// trimmed).
    pub name: String,

    /// Whether the category is active (soft delete).
    pub is_active: bool,

    /// When the category was created.
    pub created_at: DateTime<Utc>,

    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Category this product belongs to. Must reference an active category
    /// at creation time.
    pub category_id: String,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Current stock level. `None` means inventory is not tracked for this
    /// product.
    pub stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether inventory is tracked for this product.
    #[inline]
    pub fn tracks_stock(&self) -> bool {
        self.stock.is_some()
    }
}

// =============================================================================
// Tax Rule
// =============================================================================

/// A per-category tax rate override.
///
/// At most one effective rate per category at a time (primary key on
/// `category_id`). Categories without a rule fall back to the configured
/// default rate.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRule {
    /// Category this rule applies to.
    pub category_id: String,

    /// Rate in basis points (1400 = 14%).
    pub rate_bps: u32,

    /// When the rule was last set.
    pub updated_at: DateTime<Utc>,
}

impl TaxRule {
    /// Returns the rate as a TaxRate.
    #[inline]
    pub fn rate(&self) -> TaxRate {
        TaxRate::from_bps(self.rate_bps)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A finalized sale transaction.
///
/// Created only by a successful cart finalize. Immutable thereafter; owned
/// by persistence once written.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Shift this sale was rung under.
    pub shift_id: String,
    /// Terminal that produced the sale.
    pub terminal_id: String,
    /// Operator who rang the sale.
    pub operator_id: String,
    /// Human-readable receipt number.
    pub receipt_number: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item on a finalized sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Tax rate in basis points at time of sale (frozen).
    pub tax_rate_bps: u32,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total before tax (unit_price × quantity).
    pub line_subtotal_cents: i64,
    /// Tax for this line, rounded at the line.
    pub line_tax_cents: i64,
    /// Line total including tax.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1400);
        assert_eq!(rate.bps(), 1400);
        assert!((rate.percentage() - 14.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(14.0);
        assert_eq!(rate.bps(), 1400);
    }

    #[test]
    fn test_role_shift_permissions() {
        assert!(!Role::Trainee.can_manage_shifts());
        assert!(Role::Cashier.can_manage_shifts());
        assert!(Role::Manager.can_manage_shifts());
    }

    #[test]
    fn test_product_stock_tracking() {
        let now = Utc::now();
        let tracked = Product {
            id: "p1".to_string(),
            name: "Cola".to_string(),
            category_id: "c1".to_string(),
            price_cents: 200,
            stock: Some(24),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(tracked.tracks_stock());

        let untracked = Product {
            stock: None,
            ..tracked
        };
        assert!(!untracked.tracks_stock());
    }
}
