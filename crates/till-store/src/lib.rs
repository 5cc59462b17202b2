//! # till-store: Database Layer for Tillpoint
//!
//! This crate provides database access for the Tillpoint terminal.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tillpoint Data Flow                               │
//! │                                                                         │
//! │  Terminal service (CheckoutService::finalize)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Schema    │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ schema.rs    │  │   │
//! │  │   │ Connection    │    │ ShiftRepo     │    │ bootstrap()  │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │           ./till.db  (or :memory: for tests)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`schema`] - Embedded schema bootstrap
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, sale, shift)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./till.db")).await?;
//!
//! let drinks = db.catalog().add_category("Drinks").await?;
//! let cola = db.catalog().add_product("Cola", &drinks.id, 200, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::sale::SaleRepository;
pub use repository::shift::ShiftRepository;
