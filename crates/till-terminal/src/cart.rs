//! # Cart Session
//!
//! The terminal's one in-progress cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. The presentation layer may drive cart operations concurrently
//! 2. Only one operation should mutate the cart at a time
//! 3. Checkout needs a consistent snapshot while it persists
//!
//! The lock is never held across an await: catalog reads happen first,
//! then the cart mutation runs inside a short lock scope.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Session Operations                              │
//! │                                                                         │
//! │  Cashier Action        Service Call             Cart State Change       │
//! │  ──────────────        ────────────             ─────────────────       │
//! │                                                                         │
//! │  Scan product ───────► add_line() ────────────► lines.push(snapshot)   │
//! │                          │                                              │
//! │                          ├─ catalog: active product? price? tax rate?   │
//! │                          └─ freeze {name, price, rate} into the line    │
//! │                                                                         │
//! │  Change quantity ────► update_quantity(i, n) ─► lines[i].qty = n       │
//! │  Void line ──────────► remove_line(i) ────────► lines.remove(i)        │
//! │  Void sale ──────────► clear() ───────────────► lines.clear()          │
//! │  View totals ────────► snapshot() ────────────► (read only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::PosResult;
use till_core::{Cart, CartLine, CartTotals, CoreError, TaxPolicy};
use till_store::Database;

/// The terminal's single in-progress cart plus the catalog it reads from.
#[derive(Debug, Clone)]
pub struct CartSession {
    db: Database,
    policy: TaxPolicy,
    cart: Arc<Mutex<Cart>>,
}

impl CartSession {
    /// Creates an empty cart session.
    pub fn new(db: Database, policy: TaxPolicy) -> Self {
        CartSession {
            db,
            policy,
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Adds a line for a product, snapshotting its current price and the
    /// effective tax rate.
    ///
    /// ## Errors
    /// - `UnknownProduct` if the id is missing or the product is inactive
    /// - `InvalidQuantity` / `CartTooLarge` from the cart guards
    pub async fn add_line(&self, product_id: &str, quantity: i64) -> PosResult<CartTotals> {
        let product = self
            .db
            .catalog()
            .get_active_product(product_id)
            .await?
            .ok_or_else(|| CoreError::UnknownProduct {
                id: product_id.to_string(),
            })?;

        // Rate resolved fresh on every add: a rate change is visible to the
        // very next line, while existing lines keep their snapshot
        let override_rate = self.db.catalog().tax_rate_for(&product.category_id).await?;
        let rate = self.policy.effective(override_rate);

        let totals = {
            let mut cart = self.cart.lock().expect("cart lock poisoned");
            cart.push_line(CartLine::from_product(&product, rate, quantity))?;
            cart.totals()
        };

        debug!(
            product_id = %product.id,
            quantity,
            rate_bps = rate.bps(),
            total_cents = totals.total_cents,
            "Line added"
        );
        Ok(totals)
    }

    /// Updates the quantity of the line at `index`.
    pub fn update_quantity(&self, index: usize, quantity: i64) -> PosResult<CartTotals> {
        let mut cart = self.cart.lock().expect("cart lock poisoned");
        cart.update_quantity(index, quantity)?;
        Ok(cart.totals())
    }

    /// Removes the line at `index`.
    pub fn remove_line(&self, index: usize) -> PosResult<CartTotals> {
        let mut cart = self.cart.lock().expect("cart lock poisoned");
        cart.remove_line(index)?;
        Ok(cart.totals())
    }

    /// Voids the whole cart. Idempotent.
    pub fn clear(&self) {
        let mut cart = self.cart.lock().expect("cart lock poisoned");
        cart.clear();
    }

    /// Read-only copy of the cart for display.
    pub fn snapshot(&self) -> Cart {
        self.cart.lock().expect("cart lock poisoned").clone()
    }

    /// Current totals.
    pub fn totals(&self) -> CartTotals {
        self.cart.lock().expect("cart lock poisoned").totals()
    }

    /// Runs a closure against the locked cart. Used by checkout to snapshot
    /// and clear under one lock acquisition.
    pub(crate) fn with_cart_mut<T>(&self, f: impl FnOnce(&mut Cart) -> T) -> T {
        let mut cart = self.cart.lock().expect("cart lock poisoned");
        f(&mut cart)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PosError;
    use till_core::TaxRate;
    use till_store::DbConfig;

    async fn session_with_cola() -> (CartSession, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let drinks = db.catalog().add_category("Drinks").await.unwrap();
        let cola = db
            .catalog()
            .add_product("Cola", &drinks.id, 200, None)
            .await
            .unwrap();
        db.catalog().set_tax_rate(&drinks.id, 1400).await.unwrap();

        let session = CartSession::new(db, TaxPolicy::new(TaxRate::zero()));
        (session, cola.id)
    }

    #[tokio::test]
    async fn test_add_line_snapshots_price_and_rate() {
        let (session, cola_id) = session_with_cola().await;

        let totals = session.add_line(&cola_id, 3).await.unwrap();
        assert_eq!(totals.subtotal_cents, 600);
        assert_eq!(totals.tax_cents, 84);
        assert_eq!(totals.total_cents, 684);

        let cart = session.snapshot();
        assert_eq!(cart.lines[0].name, "Cola");
        assert_eq!(cart.lines[0].tax_rate_bps, 1400);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let (session, _) = session_with_cola().await;
        let err = session.add_line("no-such-product", 1).await.unwrap_err();
        assert!(matches!(
            err,
            PosError::Core(CoreError::UnknownProduct { .. })
        ));
        assert!(session.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_product_rejected() {
        let (session, cola_id) = session_with_cola().await;
        session.db.catalog().deactivate_product(&cola_id).await.unwrap();

        let err = session.add_line(&cola_id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            PosError::Core(CoreError::UnknownProduct { .. })
        ));
    }

    #[tokio::test]
    async fn test_price_change_affects_next_add_only() {
        let (session, cola_id) = session_with_cola().await;
        session.add_line(&cola_id, 1).await.unwrap();

        session.db.catalog().update_price(&cola_id, 300).await.unwrap();
        session.add_line(&cola_id, 1).await.unwrap();

        let cart = session.snapshot();
        assert_eq!(cart.lines[0].unit_price_cents, 200);
        assert_eq!(cart.lines[1].unit_price_cents, 300);
    }

    #[tokio::test]
    async fn test_default_rate_applies_without_override() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snacks = db.catalog().add_category("Snacks").await.unwrap();
        let chips = db
            .catalog()
            .add_product("Chips", &snacks.id, 150, None)
            .await
            .unwrap();

        // No tax rule for Snacks: the configured default applies
        let session = CartSession::new(db, TaxPolicy::new(TaxRate::from_bps(500)));
        session.add_line(&chips.id, 2).await.unwrap();

        let cart = session.snapshot();
        assert_eq!(cart.lines[0].tax_rate_bps, 500);
        assert_eq!(cart.tax_cents(), 15); // 300 × 5%
    }

    #[tokio::test]
    async fn test_update_remove_clear() {
        let (session, cola_id) = session_with_cola().await;
        session.add_line(&cola_id, 3).await.unwrap();

        let totals = session.update_quantity(0, 1).unwrap();
        assert_eq!(totals.total_cents, 228);

        let err = session.update_quantity(5, 1).unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::LineNotFound { .. })));

        session.remove_line(0).unwrap();
        assert!(session.snapshot().is_empty());

        session.clear();
        session.clear(); // idempotent
        assert!(session.snapshot().is_empty());
    }
}
