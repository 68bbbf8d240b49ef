//! REST API endpoint handlers

use crate::api::types::*;
use crate::bhavcopy::DateKey;
use crate::db::sqlite::models::{Favorite, HistoricalRow, StockRow, TopMover};
use crate::error::{AppError, Result};
use crate::services::{IngestResult, IngestService, RangeResult, ReconcileResult, StockService};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Json, Path, State as AxumState};
use std::sync::Arc;
use tracing::info;

/// Upper bound for an on-demand lookback download
pub const MAX_LOOKBACK_DAYS: u32 = 366;

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint - GET /health
pub async fn health_check(AxumState(state): AxumState<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        ingest_stage: state.get_ingest_stage(),
    })
}

// ============================================================================
// Ingestion
// ============================================================================

/// Single-date snapshot ingest - POST /processEquityBhavcopy
pub async fn process_equity_bhavcopy(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(req): Json<ProcessBhavcopyRequest>,
) -> Result<Json<ApiMessage<IngestResult>>> {
    let date = req
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Missing date in the request body (expected ddmmyy).".to_string())
        })?;

    let key: DateKey = date
        .parse()
        .map_err(|_| AppError::InvalidDate(date.to_string()))?;
    info!("Bhavcopy processing requested for {}", key);

    let result = IngestService::ingest_single_date(&state, key).await?;
    Ok(Json(ApiMessage::with_data(
        format!("Data processing completed for {}.", key),
        result,
    )))
}

/// Lookback download - POST /downloadBhavcopyHistory
pub async fn download_bhavcopy_history(
    AxumState(state): AxumState<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiMessage<RangeResult>>> {
    // Only an empty body falls back to the configured lookback
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        DownloadHistoryRequest::default()
    } else {
        serde_json::from_slice::<DownloadHistoryRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))?
    };
    let days = req.lookback_days.unwrap_or(state.config.lookback_days);

    if days == 0 || days > MAX_LOOKBACK_DAYS {
        return Err(AppError::Validation(format!(
            "lookbackDays must be between 1 and {}.",
            MAX_LOOKBACK_DAYS
        )));
    }

    let anchor = AppState::exchange_today();
    let result = IngestService::ingest_date_range(&state, anchor, days).await?;
    Ok(Json(ApiMessage::with_data(
        format!(
            "Downloaded {} of {} bhavcopy files.",
            result.downloaded,
            result.dates.len()
        ),
        result,
    )))
}

/// Historical rebuild for one stock - POST /fetchAndStoreStockData
pub async fn fetch_and_store_stock_data(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(req): Json<FetchStockDataRequest>,
) -> Result<Json<ApiMessage<ReconcileResult>>> {
    let name = req.stock_name.unwrap_or_default();
    let result = IngestService::ingest_range_for_named_stock(&state, &name).await?;

    Ok(Json(ApiMessage::with_data(
        "Historical stock data stored successfully.",
        result,
    )))
}

// ============================================================================
// Snapshot Queries
// ============================================================================

/// Top movers - GET /top10stocks
pub async fn top_stocks(AxumState(state): AxumState<Arc<AppState>>) -> Result<Json<Vec<TopMover>>> {
    Ok(Json(StockService::top_movers(&state)?))
}

/// Name search - GET /stocks/:name
pub async fn search_stocks(
    AxumState(state): AxumState<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<StockRow>>> {
    Ok(Json(StockService::search(&state, &name)?))
}

/// Price history - GET /stockpricehistory/:code
pub async fn stock_price_history(
    AxumState(state): AxumState<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<StockRow>>> {
    Ok(Json(StockService::price_history(&state, &code)?))
}

// ============================================================================
// Favorites
// ============================================================================

/// Add favorite - POST /addtofavorites
pub async fn add_to_favorites(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<Json<ApiMessage<Favorite>>> {
    let favorite = StockService::add_favorite(&state, req.code.as_deref(), req.name.as_deref())?;
    Ok(Json(ApiMessage::with_data(
        "Stock added to favorites successfully.",
        favorite,
    )))
}

/// List favorites - GET /favoritestocks
pub async fn favorite_stocks(
    AxumState(state): AxumState<Arc<AppState>>,
) -> Result<Json<Vec<Favorite>>> {
    Ok(Json(StockService::favorites(&state)?))
}

/// Remove favorite - DELETE /removefromfavorites/:code
pub async fn remove_from_favorites(
    AxumState(state): AxumState<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<ApiMessage<Empty>>> {
    StockService::remove_favorite(&state, &code)?;
    Ok(Json(ApiMessage::new("Stock removed from favorites successfully.")))
}

// ============================================================================
// Historical Queries
// ============================================================================

/// All historical rows - GET /historicalStockData
pub async fn historical_stock_data(
    AxumState(state): AxumState<Arc<AppState>>,
) -> Result<Json<Vec<HistoricalRow>>> {
    Ok(Json(StockService::historical(&state)?))
}
