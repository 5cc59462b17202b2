//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers, writers don't block readers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::repository::catalog::CatalogRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::shift::ShiftRepository;
use crate::schema;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/till.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-terminal POS)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to apply the schema on connect.
    /// Default: true
    pub bootstrap_schema: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            bootstrap_schema: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to apply the schema on connect.
    pub fn bootstrap_schema(mut self, bootstrap: bool) -> Self {
        self.bootstrap_schema = bootstrap;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            bootstrap_schema: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./till.db")).await?;
/// let categories = db.catalog().list_categories(true).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite for a local POS workload:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Applies the schema (if enabled)
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            // sqlite://path with mode=rwc creates the file if not exists
            let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
            SqliteConnectOptions::from_str(&connect_url)
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
                // WAL mode: readers don't block writers and vice versa
                .journal_mode(SqliteJournalMode::Wal)
                // NORMAL synchronous: safe from corruption, may lose the
                // last transaction on power failure
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true)
        };

        // SQLite has foreign keys disabled by default for backwards
        // compatibility
        let connect_options = connect_options.foreign_keys(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.bootstrap_schema {
            db.bootstrap_schema().await?;
        }

        Ok(db)
    }

    /// Applies the embedded schema.
    ///
    /// Automatically called by `new()` unless disabled in the config.
    /// Idempotent: safe to run multiple times.
    pub async fn bootstrap_schema(&self) -> StoreResult<()> {
        schema::bootstrap(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by repositories. Prefer repository
    /// methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the catalog repository (categories, products, tax rules).
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Returns the shift repository.
    pub fn shifts(&self) -> ShiftRepository {
        ShiftRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_schema_bootstrap_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.bootstrap_schema().await.unwrap();
        db.bootstrap_schema().await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }
}
