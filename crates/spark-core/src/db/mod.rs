//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `catalog` - Menu item reference data (read-only after init)
//! - `events` - Local event calendar (read-only after init)
//! - `ledger` - Append-only sales transactions
//! - `customers` - Customer id to display-name registry

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod catalog;
mod customers;
mod events;
mod ledger;

pub use ledger::LedgerFilter;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite CURRENT_TIMESTAMP string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Encode a transaction timestamp for storage
///
/// Fixed-width RFC 3339 so lexicographic ordering in SQL matches
/// chronological ordering.
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Parse a stored transaction timestamp
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Validation(format!("invalid stored timestamp {:?}: {}", s, e)))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each
    /// pooled connection would otherwise see its own private database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/quickspark_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Clear all ledger data but preserve catalog, calendar, and customers
    pub fn soft_reset(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch("DELETE FROM transactions;")?;
        info!("Ledger soft reset complete");
        Ok(())
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block the recording path
            PRAGMA journal_mode = WAL;

            -- Cache size: ~8MB (2000 pages * 4KB default page size)
            PRAGMA cache_size = 2000;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Store temp tables in memory
            PRAGMA temp_store = MEMORY;

            -- Menu items (catalog reference data)
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                cost REAL NOT NULL,
                category TEXT NOT NULL,
                standard_portion TEXT NOT NULL,
                burn_rate REAL NOT NULL,
                expiry_days INTEGER NOT NULL,
                current_stock INTEGER NOT NULL
            );

            -- Local event calendar
            CREATE TABLE IF NOT EXISTS events (
                name TEXT PRIMARY KEY,
                date DATE NOT NULL,
                impact TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);

            -- Sales ledger (append-only; no UPDATE or DELETE path exists)
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                item_id TEXT NOT NULL REFERENCES items(id),
                ts TEXT NOT NULL,
                amount REAL NOT NULL,
                quantity INTEGER NOT NULL,
                customer_id TEXT,
                recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_ts ON transactions(ts);
            CREATE INDEX IF NOT EXISTS idx_transactions_item ON transactions(item_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_customer ON transactions(customer_id);

            -- Customer registry (id to display name)
            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        db.run_migrations().unwrap();
        db.run_migrations().unwrap();
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = DateTime::parse_from_rfc3339("2025-08-05T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let encoded = encode_timestamp(ts);
        assert_eq!(parse_timestamp(&encoded).unwrap(), ts);
    }

    #[test]
    fn test_encoded_timestamps_sort_chronologically() {
        let early = DateTime::parse_from_rfc3339("2025-08-05T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = early + chrono::Duration::milliseconds(500);
        assert!(encode_timestamp(early) < encode_timestamp(late));
    }
}
