// SQLite connection pool shared by the ledger and the auction store.
//
// Owns the pool, the schema, and the transaction helper. Stores borrow the
// pool and issue their own parameterized queries against it.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteSynchronous,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Failed to open database at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Connection pool exhausted: no connection available after {0:?}")]
    PoolExhausted(Duration),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // The timeout itself is not carried by sqlx, callers that know it use `classify`.
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted(Duration::ZERO),
            other => DbError::Storage(other.to_string()),
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Where the database lives and how the pool is sized.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub path: PathBuf,

    /// Number of pooled connections.
    pub pool_size: u32,

    /// How long an operation waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/ubeconomy.db"),
            pool_size: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Future returned by a transaction body.
pub type TxFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

// ============================================================================
// DATABASE
// ============================================================================

pub struct Database {
    pool: SqlitePool,
    options: DatabaseOptions,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations.
    ///
    /// Any error here means the economy cannot start.
    pub async fn open(options: DatabaseOptions) -> Result<Self, DbError> {
        let display_path = options.path.display().to_string();
        let open_error = |reason: String| DbError::Open {
            path: display_path.clone(),
            reason,
        };

        ensure_parent_dir(&options.path).map_err(|e| open_error(e.to_string()))?;

        let connect_options = SqliteConnectOptions::new()
            .filename(&options.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .statement_cache_capacity(64);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.pool_size.max(1))
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| open_error(e.to_string()))?;

        let db = Self { pool, options };
        db.migrate()
            .await
            .map_err(|e| open_error(format!("migration failed: {e}")))?;

        tracing::info!(
            "Database ready at {} with {} pooled connections",
            db.options.path.display(),
            db.options.pool_size.max(1)
        );
        Ok(db)
    }

    /// Run database migrations to create tables.
    async fn migrate(&self) -> Result<(), DbError> {
        // Accounts: one row per player, lazily created.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                uuid TEXT PRIMARY KEY,
                balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
                updated_at INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| self.classify(e))?;

        // Listings: times are epoch milliseconds.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                seller_uuid TEXT NOT NULL,
                item_data TEXT NOT NULL,
                price INTEGER NOT NULL CHECK (price > 0),
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                current_bidder TEXT,
                current_bid INTEGER,
                CHECK (expires_at > created_at)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| self.classify(e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_expires ON listings(expires_at)")
            .execute(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_seller ON listings(seller_uuid)")
            .execute(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        tracing::debug!("Database tables created/verified");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Convert a driver error, filling in the configured acquire timeout.
    pub fn classify(&self, err: sqlx::Error) -> DbError {
        match err {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted(self.options.acquire_timeout),
            other => DbError::from(other),
        }
    }

    /// Run `body` inside a transaction.
    ///
    /// Commits when the body returns `Ok`, rolls back on `Err`. A transaction
    /// dropped without commit is rolled back by the driver.
    pub async fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> TxFuture<'c, T, E> + Send,
        T: Send,
        E: From<DbError> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(|e| self.classify(e))?;

        match body(&mut *tx).await {
            Ok(value) => {
                tx.commit().await.map_err(|e| self.classify(e))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Close every pooled connection. Outstanding operations finish first.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
