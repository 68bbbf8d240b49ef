//! Stock Service
//!
//! Read-side queries over the snapshot and historical tables, and the
//! favorites list.

use crate::db::sqlite::models::{Favorite, HistoricalRow, StockRow, TopMover};
use crate::error::{AppError, Result};
use crate::state::AppState;
use tracing::info;

/// Rows returned by the top-movers query
pub const TOP_MOVERS_LIMIT: usize = 10;

/// Stock service for business logic
pub struct StockService;

impl StockService {
    /// Largest open-to-close gainers of the current snapshot
    pub fn top_movers(state: &AppState) -> Result<Vec<TopMover>> {
        state.sqlite.top_movers(TOP_MOVERS_LIMIT)
    }

    /// Snapshot rows whose name contains `query`
    pub fn search(state: &AppState, query: &str) -> Result<Vec<StockRow>> {
        state.sqlite.search_stocks(query)
    }

    /// Snapshot rows for a stock code
    pub fn price_history(state: &AppState, code: &str) -> Result<Vec<StockRow>> {
        state.sqlite.price_history(code)
    }

    /// Add a snapshot stock to favorites
    pub fn add_favorite(state: &AppState, code: Option<&str>, name: Option<&str>) -> Result<Favorite> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        let (Some(code), Some(name)) = (present(code), present(name)) else {
            return Err(AppError::Validation(
                "Bad Request. Missing code or name in the request body.".to_string(),
            ));
        };

        info!("StockService::add_favorite - code={}, name={}", code, name);

        if !state.sqlite.stock_exists(code, name)? {
            return Err(AppError::Conflict(
                "Stock does not exist in the stocks table.".to_string(),
            ));
        }
        if state.sqlite.get_favorite(code)?.is_some() {
            return Err(AppError::Conflict("Stock is already in favorites.".to_string()));
        }

        state.sqlite.add_favorite(code, name)
    }

    /// All favorites in insertion order
    pub fn favorites(state: &AppState) -> Result<Vec<Favorite>> {
        state.sqlite.get_favorites()
    }

    /// Remove a favorite; removing an absent code is not an error
    pub fn remove_favorite(state: &AppState, code: &str) -> Result<usize> {
        info!("StockService::remove_favorite - code={}", code);
        state.sqlite.remove_favorite(code)
    }

    /// All historical rows, newest first
    pub fn historical(state: &AppState) -> Result<Vec<HistoricalRow>> {
        let rows = state.sqlite.historical_rows()?;
        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No historical stock data available.".to_string(),
            ));
        }
        Ok(rows)
    }
}
