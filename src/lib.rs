//! Bhavcopy Server - End-of-day equity market data
//!
//! Downloads the exchange's daily bhavcopy archives, loads them into SQLite
//! and serves top movers, search, favorites and historical rows over HTTP.

pub mod api;
pub mod bhavcopy;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

use config::AppConfig;
use services::IngestService;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize and run the API server until Ctrl-C
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bhavcopy_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bhavcopy Server...");

    let config = AppConfig::from_env()?;
    let app_state = Arc::new(AppState::new(config)?);
    tracing::info!("Application state initialized");

    spawn_startup_backfill(app_state.clone());

    api::serve(app_state, shutdown_signal()).await?;

    tracing::info!("Bhavcopy Server stopped");
    Ok(())
}

/// Download the configured lookback window in the background
fn spawn_startup_backfill(state: Arc<AppState>) {
    let days = state.config.lookback_days;
    if days == 0 {
        tracing::info!("Startup download disabled");
        return;
    }

    tokio::spawn(async move {
        let anchor = AppState::exchange_today();
        match IngestService::ingest_date_range(&state, anchor, days).await {
            Ok(result) => tracing::info!(
                "Startup download complete: {} of {} days fetched",
                result.downloaded,
                days
            ),
            Err(e) => tracing::error!("Startup download failed: {}", e),
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
