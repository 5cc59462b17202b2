//! End-to-end terminal flow over an in-memory database: shift open,
//! catalog setup, cart, finalize, and cash reconciliation.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use till_core::{CoreError, Money, Operator, Role};
use till_store::{Database, DbConfig};
use till_terminal::{FixedClock, PosError, Session, Terminal, TerminalConfig};

fn test_config() -> TerminalConfig {
    TerminalConfig {
        terminal_id: "till-01".to_string(),
        store_name: "Corner Shop".to_string(),
        default_tax_rate_bps: 0,
    }
}

fn cashier_session() -> Session {
    Session::with_clock(
        Operator {
            id: "op-1".to_string(),
            name: "Alice".to_string(),
            role: Role::Cashier,
        },
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap(),
        )),
    )
}

async fn terminal() -> Terminal {
    // RUST_LOG=debug surfaces the service/repository traces when a test fails
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Terminal::new(test_config(), db)
}

#[tokio::test]
async fn full_sale_day_in_the_life() {
    let terminal = terminal().await;
    let session = cashier_session();

    // Open the shift with a 100.00 float
    let shift = terminal
        .shifts()
        .open_shift(&session, Money::from_cents(10_000))
        .await
        .unwrap();
    assert_eq!(shift.expected_cash_cents, 10_000);

    // Catalog: Drinks at 14%, Cola at 2.00
    let drinks = terminal.catalog().add_category("Drinks").await.unwrap();
    let cola = terminal
        .catalog()
        .add_product("Cola", &drinks.id, 200, None)
        .await
        .unwrap();
    terminal
        .catalog()
        .set_tax_rate(&drinks.id, 1400)
        .await
        .unwrap();

    // Ring three colas: 6.00 subtotal, 0.84 tax, 6.84 total
    let totals = terminal.cart().add_line(&cola.id, 3).await.unwrap();
    assert_eq!(totals.subtotal_cents, 600);
    assert_eq!(totals.tax_cents, 84);
    assert_eq!(totals.total_cents, 684);

    let sale = terminal.checkout().finalize(&session).await.unwrap();
    assert_eq!(sale.subtotal_cents, 600);
    assert_eq!(sale.tax_cents, 84);
    assert_eq!(sale.total_cents, 684);
    assert_eq!(sale.receipt_number, "260823-090000-0001");

    // Cart is empty, drawer expects 106.84
    assert!(terminal.cart().snapshot().is_empty());
    let open = terminal.shifts().current_shift().await.unwrap().unwrap();
    assert_eq!(open.expected_cash_cents, 10_684);

    // Count the drawer exactly: variance zero
    let closed = terminal
        .shifts()
        .close_shift(&session, Money::from_cents(10_684))
        .await
        .unwrap();
    assert_eq!(closed.variance_cents, Some(0));
    assert_eq!(closed.counted_cash_cents, Some(10_684));
}

#[tokio::test]
async fn finalize_empty_cart_persists_nothing() {
    let terminal = terminal().await;
    let session = cashier_session();

    terminal
        .shifts()
        .open_shift(&session, Money::from_cents(10_000))
        .await
        .unwrap();

    let err = terminal.checkout().finalize(&session).await.unwrap_err();
    assert!(matches!(err, PosError::Core(CoreError::EmptyCart)));

    // Drawer untouched
    let open = terminal.shifts().current_shift().await.unwrap().unwrap();
    assert_eq!(open.expected_cash_cents, 10_000);
}

#[tokio::test]
async fn finalize_without_open_shift_leaves_cart_intact() {
    let terminal = terminal().await;
    let session = cashier_session();

    let drinks = terminal.catalog().add_category("Drinks").await.unwrap();
    let cola = terminal
        .catalog()
        .add_product("Cola", &drinks.id, 200, None)
        .await
        .unwrap();
    terminal.cart().add_line(&cola.id, 2).await.unwrap();

    let err = terminal.checkout().finalize(&session).await.unwrap_err();
    assert!(matches!(err, PosError::Core(CoreError::ShiftNotOpen)));

    // The cashier's work is preserved for retry after opening a shift
    assert_eq!(terminal.cart().snapshot().line_count(), 1);
}

#[tokio::test]
async fn mixed_rates_round_per_line() {
    let terminal = terminal().await;
    let session = cashier_session();

    terminal
        .shifts()
        .open_shift(&session, Money::from_cents(0))
        .await
        .unwrap();

    let drinks = terminal.catalog().add_category("Drinks").await.unwrap();
    let books = terminal.catalog().add_category("Books").await.unwrap();
    terminal
        .catalog()
        .set_tax_rate(&drinks.id, 825)
        .await
        .unwrap();
    // Books stay at the default 0% rate

    let soda = terminal
        .catalog()
        .add_product("Soda", &drinks.id, 1000, None)
        .await
        .unwrap();
    let novel = terminal
        .catalog()
        .add_product("Novel", &books.id, 1500, None)
        .await
        .unwrap();

    // Two $10.00 sodas as separate lines: 82.5¢ each rounds half up to 83¢
    terminal.cart().add_line(&soda.id, 1).await.unwrap();
    terminal.cart().add_line(&soda.id, 1).await.unwrap();
    terminal.cart().add_line(&novel.id, 1).await.unwrap();

    let totals = terminal.cart().totals();
    assert_eq!(totals.subtotal_cents, 3500);
    assert_eq!(totals.tax_cents, 166);
    assert_eq!(totals.total_cents, 3666);

    let sale = terminal.checkout().finalize(&session).await.unwrap();
    assert_eq!(sale.total_cents, 3666);
    assert_eq!(
        sale.subtotal_cents + sale.tax_cents,
        sale.total_cents,
        "per-line totals must sum exactly"
    );
}

#[tokio::test]
async fn sale_lines_freeze_catalog_state_at_ring_time() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let terminal = Terminal::new(test_config(), db.clone());
    let session = cashier_session();

    terminal
        .shifts()
        .open_shift(&session, Money::from_cents(0))
        .await
        .unwrap();

    let drinks = terminal.catalog().add_category("Drinks").await.unwrap();
    let cola = terminal
        .catalog()
        .add_product("Cola", &drinks.id, 200, None)
        .await
        .unwrap();

    terminal.cart().add_line(&cola.id, 1).await.unwrap();

    // Price change and even retirement after the ring do not affect the line
    terminal.catalog().update_price(&cola.id, 999).await.unwrap();
    terminal.catalog().remove_product(&cola.id).await.unwrap();

    let sale = terminal.checkout().finalize(&session).await.unwrap();
    assert_eq!(sale.subtotal_cents, 200);

    let lines = db.sales().get_lines(&sale.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name_snapshot, "Cola");
    assert_eq!(lines[0].unit_price_cents, 200);
    assert_eq!(lines[0].product_id, cola.id);
}

#[tokio::test]
async fn two_sales_accumulate_in_the_drawer() {
    let terminal = terminal().await;
    let session = cashier_session();

    terminal
        .shifts()
        .open_shift(&session, Money::from_cents(5_000))
        .await
        .unwrap();

    let drinks = terminal.catalog().add_category("Drinks").await.unwrap();
    terminal
        .catalog()
        .set_tax_rate(&drinks.id, 1400)
        .await
        .unwrap();
    let cola = terminal
        .catalog()
        .add_product("Cola", &drinks.id, 200, None)
        .await
        .unwrap();

    terminal.cart().add_line(&cola.id, 3).await.unwrap();
    let first = terminal.checkout().finalize(&session).await.unwrap();

    terminal.cart().add_line(&cola.id, 1).await.unwrap();
    let second = terminal.checkout().finalize(&session).await.unwrap();

    // Distinct receipts even under a fixed clock
    assert_ne!(first.receipt_number, second.receipt_number);

    // 50.00 + 6.84 + 2.28
    let open = terminal.shifts().current_shift().await.unwrap().unwrap();
    assert_eq!(open.expected_cash_cents, 5_000 + 684 + 228);

    // Drawer short by 12 cents at close
    let closed = terminal
        .shifts()
        .close_shift(&session, Money::from_cents(5_900))
        .await
        .unwrap();
    assert_eq!(closed.variance_cents, Some(5_900 - 5_912));
}
