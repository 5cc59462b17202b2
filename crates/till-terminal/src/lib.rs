//! # till-terminal: Terminal Session Layer for Tillpoint
//!
//! The surface a presentation layer drives: catalog management, the
//! in-progress cart, checkout, and the shift lifecycle, wired over
//! `till-core` (pure rules) and `till-store` (persistence).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tillpoint Layering                                 │
//! │                                                                         │
//! │  Presentation (desktop shell, line UI, integration tests)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  till-terminal (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  Terminal ──┬── CatalogService   validation + guard delegation  │   │
//! │  │             ├── CartSession      Arc<Mutex<Cart>> + snapshots   │   │
//! │  │             ├── Checkout         atomic finalize                │   │
//! │  │             └── ShiftController  role checks + lifecycle        │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                          │                                     │
//! │       ▼                          ▼                                     │
//! │  till-core (pure rules)     till-store (SQLite)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_core::{Money, Operator, Role};
//! use till_store::{Database, DbConfig};
//! use till_terminal::{Session, Terminal, TerminalConfig};
//!
//! let db = Database::new(DbConfig::new("./till.db")).await?;
//! let terminal = Terminal::new(TerminalConfig::default(), db);
//! let session = Session::new(Operator {
//!     id: "op-1".into(),
//!     name: "Alice".into(),
//!     role: Role::Cashier,
//! });
//!
//! terminal.shifts().open_shift(&session, Money::from_cents(10_000)).await?;
//! terminal.cart().add_line(&cola_id, 3).await?;
//! let sale = terminal.checkout().finalize(&session).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod shift;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::CartSession;
pub use catalog::CatalogService;
pub use checkout::Checkout;
pub use config::TerminalConfig;
pub use error::{PosError, PosResult};
pub use session::{Clock, FixedClock, Session, SystemClock};
pub use shift::ShiftController;

use till_core::TaxPolicy;
use till_store::Database;

// =============================================================================
// Terminal
// =============================================================================

/// One terminal's wired service set.
///
/// Services share the database handle and the cart session; cloning the
/// terminal (or any service) is cheap and refers to the same state.
#[derive(Debug, Clone)]
pub struct Terminal {
    config: TerminalConfig,
    db: Database,
    cart: CartSession,
    checkout: Checkout,
}

impl Terminal {
    /// Wires a terminal from its configuration and an open database.
    pub fn new(config: TerminalConfig, db: Database) -> Self {
        let policy = TaxPolicy::new(config.default_tax_rate());
        let cart = CartSession::new(db.clone(), policy);
        let checkout = Checkout::new(db.clone(), cart.clone(), config.terminal_id.clone());
        Terminal {
            config,
            db,
            cart,
            checkout,
        }
    }

    /// The terminal configuration.
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Catalog management.
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.clone())
    }

    /// The in-progress cart.
    pub fn cart(&self) -> &CartSession {
        &self.cart
    }

    /// Checkout bound to this terminal's cart. A single receipt sequence
    /// is shared across clones.
    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Shift lifecycle for this terminal.
    pub fn shifts(&self) -> ShiftController {
        ShiftController::new(self.db.clone(), self.config.terminal_id.clone())
    }
}
