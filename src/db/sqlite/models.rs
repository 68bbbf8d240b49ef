//! SQLite database models

use serde::{Deserialize, Serialize};

/// Row of the `stocks` snapshot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub code: String,
    pub name: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub date: Option<String>,
}

/// Snapshot row ranked by intraday change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMover {
    pub code: String,
    pub name: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub date: Option<String>,
    /// `(close - open) / open * 100`, rounded to 2 places; `None` when open is 0
    pub change_pct: Option<f64>,
}

/// Favorite stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Row of the `stock_data` historical table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRow {
    pub date: String,
    pub code: String,
    pub name: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}
