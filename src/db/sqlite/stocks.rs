//! Latest-session snapshot (`stocks` table)

use crate::bhavcopy::StockRecord;
use crate::db::sqlite::models::{StockRow, TopMover};
use crate::error::Result;
use rusqlite::{params, Connection, Row};

/// Replace the snapshot with `records` (clear + insert in one transaction)
pub fn replace_snapshot(conn: &mut Connection, records: &[StockRecord]) -> Result<usize> {
    let tx = conn.transaction()?;

    let cleared = tx.execute("DELETE FROM stocks", [])?;
    tracing::info!("Stocks table cleared ({} rows)", cleared);

    let mut stmt = tx.prepare(
        "INSERT INTO stocks (code, name, open, high, low, close)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for record in records {
        stmt.execute(params![
            record.code,
            record.name,
            record.open,
            record.high,
            record.low,
            record.close,
        ])?;
    }

    drop(stmt);
    tx.commit()?;

    tracing::info!("Stored {} stocks in snapshot", records.len());
    Ok(records.len())
}

fn stock_from_row(row: &Row<'_>) -> rusqlite::Result<StockRow> {
    Ok(StockRow {
        code: row.get(0)?,
        name: row.get(1)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        date: row.get(6)?,
    })
}

/// Snapshot rows with the largest open-to-close gain first
pub fn top_movers(conn: &Connection, limit: usize) -> Result<Vec<TopMover>> {
    let mut stmt = conn.prepare(
        "SELECT code, name, open, high, low, close, date,
                ROUND((close - open) / open * 100, 2) AS change_pct
         FROM stocks
         ORDER BY change_pct DESC
         LIMIT ?1",
    )?;

    let movers = stmt
        .query_map(params![limit as i64], |row| {
            Ok(TopMover {
                code: row.get(0)?,
                name: row.get(1)?,
                open: row.get(2)?,
                high: row.get(3)?,
                low: row.get(4)?,
                close: row.get(5)?,
                date: row.get(6)?,
                change_pct: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(movers)
}

/// Snapshot rows whose name contains `query`
pub fn search_by_name(conn: &Connection, query: &str) -> Result<Vec<StockRow>> {
    let pattern = format!("%{}%", query);

    let mut stmt = conn.prepare(
        "SELECT code, name, open, high, low, close, date
         FROM stocks
         WHERE name LIKE ?1",
    )?;

    let stocks = stmt
        .query_map(params![pattern], stock_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(stocks)
}

/// Snapshot rows for one code, oldest first
pub fn price_history(conn: &Connection, code: &str) -> Result<Vec<StockRow>> {
    let mut stmt = conn.prepare(
        "SELECT code, name, open, high, low, close, date
         FROM stocks
         WHERE code = ?1
         ORDER BY date ASC",
    )?;

    let stocks = stmt
        .query_map(params![code], stock_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(stocks)
}

/// Whether the snapshot holds a row with this code and name
pub fn exists(conn: &Connection, code: &str, name: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM stocks WHERE code = ?1 AND name = ?2)",
        params![code, name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Get snapshot row count
pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM stocks", [], |row| row.get(0))?;
    Ok(count)
}
