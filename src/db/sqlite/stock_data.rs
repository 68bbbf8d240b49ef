//! Historical rows (`stock_data` table)
//!
//! Inserts are independent statements: a failure partway through keeps the
//! rows already written.

use crate::bhavcopy::StockRecord;
use crate::db::sqlite::models::HistoricalRow;
use crate::error::Result;
use rusqlite::{params, Connection};

/// Delete every historical row
pub fn clear(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM stock_data", [])?;
    tracing::info!("Cleared {} rows from stock_data", deleted);
    Ok(deleted)
}

/// Append `records` tagged with `date` (`yyyy-mm-dd`)
pub fn insert_many(conn: &Connection, records: &[StockRecord], date: &str) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO stock_data (date, code, name, open, high, low, close)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for record in records {
        stmt.execute(params![
            date,
            record.code,
            record.name,
            record.open,
            record.high,
            record.low,
            record.close,
        ])?;
    }

    tracing::debug!("Inserted {} historical rows for {}", records.len(), date);
    Ok(records.len())
}

/// All historical rows, newest first
pub fn list_all(conn: &Connection) -> Result<Vec<HistoricalRow>> {
    let mut stmt = conn.prepare(
        "SELECT date, code, name, open, high, low, close
         FROM stock_data
         ORDER BY date DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(HistoricalRow {
                date: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
                open: row.get(3)?,
                high: row.get(4)?,
                low: row.get(5)?,
                close: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Get historical row count
pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM stock_data", [], |row| row.get(0))?;
    Ok(count)
}
