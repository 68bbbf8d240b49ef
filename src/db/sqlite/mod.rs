//! SQLite database module

pub mod models;
mod migrations;
mod stocks;
mod stock_data;
mod favorites;

use crate::bhavcopy::{DateKey, StockRecord};
use crate::error::Result;
use models::*;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::with_connection(conn)
    }

    /// Private in-memory database, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Bulk Loading ==========

    /// Replace the `stocks` snapshot with `records`
    pub fn load_snapshot(&self, records: &[StockRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        stocks::replace_snapshot(&mut conn, records)
    }

    /// Append `records` to `stock_data` under the session date of `key`
    pub fn load_historical(&self, records: &[StockRecord], key: &DateKey) -> Result<usize> {
        let conn = self.conn.lock();
        stock_data::insert_many(&conn, records, &key.storage_date())
    }

    /// Remove all historical rows before a full re-ingest
    pub fn clear_historical(&self) -> Result<usize> {
        let conn = self.conn.lock();
        stock_data::clear(&conn)
    }

    // ========== Snapshot Queries ==========

    /// Top movers by open-to-close percentage change
    pub fn top_movers(&self, limit: usize) -> Result<Vec<TopMover>> {
        let conn = self.conn.lock();
        stocks::top_movers(&conn, limit)
    }

    /// Search snapshot by partial name
    pub fn search_stocks(&self, query: &str) -> Result<Vec<StockRow>> {
        let conn = self.conn.lock();
        stocks::search_by_name(&conn, query)
    }

    /// Snapshot rows for a stock code
    pub fn price_history(&self, code: &str) -> Result<Vec<StockRow>> {
        let conn = self.conn.lock();
        stocks::price_history(&conn, code)
    }

    /// Check a stock is part of the current snapshot
    pub fn stock_exists(&self, code: &str, name: &str) -> Result<bool> {
        let conn = self.conn.lock();
        stocks::exists(&conn, code, name)
    }

    /// Get snapshot row count
    pub fn count_stocks(&self) -> Result<i64> {
        let conn = self.conn.lock();
        stocks::count(&conn)
    }

    // ========== Historical Queries ==========

    /// All historical rows, newest first
    pub fn historical_rows(&self) -> Result<Vec<HistoricalRow>> {
        let conn = self.conn.lock();
        stock_data::list_all(&conn)
    }

    /// Get historical row count
    pub fn count_historical(&self) -> Result<i64> {
        let conn = self.conn.lock();
        stock_data::count(&conn)
    }

    // ========== Favorites ==========

    /// Add a favorite
    pub fn add_favorite(&self, code: &str, name: &str) -> Result<Favorite> {
        let conn = self.conn.lock();
        favorites::insert(&conn, code, name)
    }

    /// Get favorite by code
    pub fn get_favorite(&self, code: &str) -> Result<Option<Favorite>> {
        let conn = self.conn.lock();
        favorites::get_by_code(&conn, code)
    }

    /// Get all favorites
    pub fn get_favorites(&self) -> Result<Vec<Favorite>> {
        let conn = self.conn.lock();
        favorites::list(&conn)
    }

    /// Remove a favorite by code
    pub fn remove_favorite(&self, code: &str) -> Result<usize> {
        let conn = self.conn.lock();
        favorites::delete_by_code(&conn, code)
    }
}
