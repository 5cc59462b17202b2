//! # Cart Engine
//!
//! The in-progress order: an ordered sequence of lines plus totals that are
//! recomputed as a pure function of the lines after every mutation.
//!
//! ## Recomputation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Totals Recomputation                            │
//! │                                                                         │
//! │  push_line / update_quantity / remove_line / clear                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per line:  subtotal = unit_price × qty                                │
//! │             tax      = round_half_up(subtotal × rate)   ← at the line  │
//! │             total    = subtotal + tax                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart:      subtotal   = Σ line subtotals                              │
//! │             tax_total  = Σ line taxes (already rounded)                │
//! │             grand      = subtotal + tax_total                          │
//! │                                                                         │
//! │  INVARIANT: subtotal + tax_total == grand_total, exactly, always       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Snapshots
//! A line freezes the unit price and tax rate at the moment it is added.
//! Catalog price changes after that point do not retroactively affect the
//! line; the next `add_line` reads the catalog fresh.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the in-progress cart.
///
/// Owned exclusively by the cart; never persisted independently. On
/// finalize it is deep-copied into an immutable [`crate::types::SaleLine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line references.
    pub product_id: String,

    /// Product name at time of adding (frozen, for display and receipts).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Tax rate in basis points at time of adding (frozen).
    pub tax_rate_bps: u32,

    /// Quantity on this line. Always positive.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a cart line from a product, snapshotting price and rate.
    ///
    /// ## Price Freezing
    /// The price and tax rate are captured at this moment. If the product
    /// changes in the catalog afterwards, this line retains the originals.
    pub fn from_product(product: &Product, rate: TaxRate, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            tax_rate_bps: rate.bps(),
            quantity,
        }
    }

    /// Line total before tax (unit price × quantity).
    pub fn line_subtotal_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Tax for this line, rounded half up at the line.
    pub fn line_tax_cents(&self) -> i64 {
        Money::from_cents(self.line_subtotal_cents())
            .calculate_tax(TaxRate::from_bps(self.tax_rate_bps))
            .cents()
    }

    /// Line total including tax.
    pub fn line_total_cents(&self) -> i64 {
        self.line_subtotal_cents() + self.line_tax_cents()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The transient, mutable accumulation of line items before finalize.
///
/// ## Invariants
/// - Lines keep insertion order; mutations address lines by index
/// - Every line quantity is in `1..=MAX_LINE_QUANTITY`
/// - At most `MAX_CART_LINES` lines
/// - Totals always satisfy `subtotal + tax_total == grand_total`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Appends a line to the cart.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if the quantity is not in `1..=MAX_LINE_QUANTITY`
    /// - `CartTooLarge` if the cart is at its line ceiling
    pub fn push_line(&mut self, line: CartLine) -> CoreResult<()> {
        if line.quantity <= 0 || line.quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                quantity: line.quantity,
            });
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Updates the quantity of the line at `index`.
    ///
    /// ## Errors
    /// - `LineNotFound` if the index is out of range
    /// - `InvalidQuantity` if the quantity is not in `1..=MAX_LINE_QUANTITY`
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity { quantity });
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index })?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes and returns the line at `index`.
    ///
    /// ## Errors
    /// - `LineNotFound` if the index is out of range
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Clears all lines. Idempotent.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Subtotal (before tax), as a sum over line subtotals.
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_subtotal_cents()).sum()
    }

    /// Total tax, as a sum over per-line rounded taxes.
    pub fn tax_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_tax_cents()).sum()
    }

    /// Grand total (subtotal + tax).
    pub fn total_cents(&self) -> i64 {
        self.subtotal_cents() + self.tax_cents()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Read-only totals snapshot for display.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal_cents(),
            tax_cents: cart.tax_cents(),
            total_cents: cart.total_cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category_id: "cat-1".to_string(),
            price_cents,
            stock: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(id: &str, price_cents: i64, rate_bps: u32, qty: i64) -> CartLine {
        CartLine::from_product(&test_product(id, price_cents), TaxRate::from_bps(rate_bps), qty)
    }

    #[test]
    fn test_push_line_and_totals() {
        let mut cart = Cart::new();
        cart.push_line(line("1", 200, 1400, 3)).unwrap(); // 3 × $2.00 at 14%

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal_cents(), 600);
        assert_eq!(cart.tax_cents(), 84);
        assert_eq!(cart.total_cents(), 684);
    }

    #[test]
    fn test_totals_invariant_after_every_mutation() {
        let mut cart = Cart::new();
        cart.push_line(line("1", 1000, 825, 1)).unwrap();
        cart.push_line(line("2", 333, 1400, 2)).unwrap();
        assert_eq!(cart.subtotal_cents() + cart.tax_cents(), cart.total_cents());

        cart.update_quantity(0, 5).unwrap();
        assert_eq!(cart.subtotal_cents() + cart.tax_cents(), cart.total_cents());

        cart.remove_line(1).unwrap();
        assert_eq!(cart.subtotal_cents() + cart.tax_cents(), cart.total_cents());

        cart.clear();
        assert_eq!(cart.total_cents(), 0);
    }

    #[test]
    fn test_tax_rounds_per_line_not_at_the_end() {
        // Two $10.00 lines at 8.25%: per-line tax is 82.5¢ → 83¢ each.
        // Rounding once over the summed subtotal would give 165¢; rounding
        // per line gives 166¢. The per-line result is the contract.
        let mut cart = Cart::new();
        cart.push_line(line("1", 1000, 825, 1)).unwrap();
        cart.push_line(line("2", 1000, 825, 1)).unwrap();

        assert_eq!(cart.tax_cents(), 166);
        assert_eq!(cart.total_cents(), 2166);
    }

    #[test]
    fn test_update_quantity_recomputes() {
        let mut cart = Cart::new();
        cart.push_line(line("1", 200, 1400, 3)).unwrap();
        cart.update_quantity(0, 1).unwrap();

        assert_eq!(cart.subtotal_cents(), 200);
        assert_eq!(cart.tax_cents(), 28); // 200 × 14% = 28
        assert_eq!(cart.total_cents(), 228);
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let mut cart = Cart::new();
        let err = cart.push_line(line("1", 200, 0, 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: 0 }));

        cart.push_line(line("1", 200, 0, 1)).unwrap();
        let err = cart.update_quantity(0, -4).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: -4 }));
        // No state mutation on the failed update
        assert_eq!(cart.lines[0].quantity, 1);
    }

    #[test]
    fn test_line_not_found() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.remove_line(0),
            Err(CoreError::LineNotFound { index: 0 })
        ));
        assert!(matches!(
            cart.update_quantity(7, 2),
            Err(CoreError::LineNotFound { index: 7 })
        ));
    }

    #[test]
    fn test_price_snapshot_is_frozen() {
        let mut product = test_product("1", 200);
        let mut cart = Cart::new();
        cart.push_line(CartLine::from_product(&product, TaxRate::from_bps(1400), 3))
            .unwrap();

        // Catalog price change does not touch the existing line...
        product.price_cents = 999;
        assert_eq!(cart.subtotal_cents(), 600);

        // ...but a fresh add reads the new price.
        cart.push_line(CartLine::from_product(&product, TaxRate::from_bps(1400), 1))
            .unwrap();
        assert_eq!(cart.lines[1].unit_price_cents, 999);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new();
        cart.push_line(line("1", 200, 1400, 1)).unwrap();
        cart.clear();
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_line_ceiling() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            cart.push_line(line(&i.to_string(), 100, 0, 1)).unwrap();
        }
        let err = cart.push_line(line("overflow", 100, 0, 1)).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }
}
