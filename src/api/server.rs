//! HTTP server for the dashboard REST API

use crate::api::handlers;
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    // Dashboard is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ================================================================
        // Health check
        // ================================================================
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))

        // ================================================================
        // Ingestion
        // ================================================================
        .route("/processEquityBhavcopy", post(handlers::process_equity_bhavcopy))
        .route("/downloadBhavcopyHistory", post(handlers::download_bhavcopy_history))
        .route("/fetchAndStoreStockData", post(handlers::fetch_and_store_stock_data))

        // ================================================================
        // Snapshot queries
        // ================================================================
        .route("/top10stocks", get(handlers::top_stocks))
        .route("/stocks/:name", get(handlers::search_stocks))
        .route("/stockpricehistory/:code", get(handlers::stock_price_history))

        // ================================================================
        // Favorites
        // ================================================================
        .route("/addtofavorites", post(handlers::add_to_favorites))
        .route("/favoritestocks", get(handlers::favorite_stocks))
        .route("/removefromfavorites/:code", delete(handlers::remove_from_favorites))

        // ================================================================
        // Historical data
        // ================================================================
        .route("/historicalStockData", get(handlers::historical_stock_data))

        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until `shutdown` resolves
pub async fn serve(state: Arc<AppState>, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let addr = state.config.bind_addr()?;
    let app = build_router(state);

    info!("Starting bhavcopy API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("");
    info!("=== Endpoints ===");
    info!("  GET    http://{}/health", addr);
    info!("  POST   http://{}/processEquityBhavcopy", addr);
    info!("  POST   http://{}/downloadBhavcopyHistory", addr);
    info!("  POST   http://{}/fetchAndStoreStockData", addr);
    info!("  GET    http://{}/top10stocks", addr);
    info!("  GET    http://{}/stocks/{{name}}", addr);
    info!("  GET    http://{}/stockpricehistory/{{code}}", addr);
    info!("  POST   http://{}/addtofavorites", addr);
    info!("  GET    http://{}/favoritestocks", addr);
    info!("  DELETE http://{}/removefromfavorites/{{code}}", addr);
    info!("  GET    http://{}/historicalStockData", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        info!("API server shutting down");
    });

    if let Err(e) = server.await {
        error!("API server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::SqliteDb;
    use crate::test_support::{bhavcopy_zip, sample_csv, test_config, FakeArchiveSource};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn create_app() -> (TempDir, Arc<AppState>, Router) {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        config.ensure_dirs().unwrap();
        let source = FakeArchiveSource::default().with("150324", bhavcopy_zip("150324", &sample_csv()));
        let state = Arc::new(AppState::with_parts(
            config,
            Arc::new(SqliteDb::open_in_memory().unwrap()),
            Arc::new(source),
        ));
        let app = build_router(state.clone());
        (dir, state, app)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, _state, app) = create_app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ingest_stage"], "idle");
    }

    #[tokio::test]
    async fn test_process_bhavcopy_then_query() {
        let (_dir, _state, app) = create_app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/processEquityBhavcopy",
            Some(json!({"date": "150324"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["records"], 3);

        let (status, body) = call(&app, Method::GET, "/top10stocks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["name"], "SBIN");

        let (_, body) = call(&app, Method::GET, "/stocks/BANK", None).await;
        assert_eq!(body[0]["code"], "500180");

        let (_, body) = call(&app, Method::GET, "/stockpricehistory/500325", None).await;
        assert_eq!(body[0]["close"], 2530.0);
    }

    #[tokio::test]
    async fn test_process_bhavcopy_client_errors() {
        let (_dir, _state, app) = create_app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/processEquityBhavcopy",
            Some(json!({"date": "160324"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_DATE");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid date"));

        let (status, _) = call(&app, Method::POST, "/processEquityBhavcopy", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/processEquityBhavcopy",
            Some(json!({"date": "15-03-24"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_favorites_flow() {
        let (_dir, _state, app) = create_app();
        call(&app, Method::POST, "/processEquityBhavcopy", Some(json!({"date": "150324"}))).await;

        let fav = json!({"code": 500325, "name": "RELIANCE"});
        let (status, _) = call(&app, Method::POST, "/addtofavorites", Some(fav.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::POST, "/addtofavorites", Some(fav)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Stock is already in favorites.");

        let (status, _) = call(&app, Method::POST, "/addtofavorites", Some(json!({"code": "1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, Method::GET, "/favoritestocks", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = call(&app, Method::DELETE, "/removefromfavorites/500325", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, Method::GET, "/favoritestocks", None).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_historical_flow() {
        let (_dir, state, app) = create_app();

        let (status, body) = call(&app, Method::GET, "/historicalStockData", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No historical stock data available.");

        std::fs::write(state.config.bhavcopy_dir().join("EQ150324.CSV"), sample_csv()).unwrap();

        let (status, body) = call(
            &app,
            Method::POST,
            "/fetchAndStoreStockData",
            Some(json!({"stockName": "SBIN"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rows_inserted"], 1);

        let (status, body) = call(&app, Method::GET, "/historicalStockData", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["date"], "2024-03-15");
        assert_eq!(body[0]["name"], "SBIN");

        let (status, _) = call(&app, Method::POST, "/fetchAndStoreStockData", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_history_validates_days() {
        let (_dir, _state, app) = create_app();

        // Configured lookback is 0 in tests, so an empty body is rejected
        let (status, _) = call(&app, Method::POST, "/downloadBhavcopyHistory", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/downloadBhavcopyHistory",
            Some(json!({"lookbackDays": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            Method::POST,
            "/downloadBhavcopyHistory",
            Some(json!({"lookbackDays": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["dates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_download_history_rejects_malformed_body() {
        let (_dir, _state, app) = create_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/downloadBhavcopyHistory")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"lookbackDays": 3"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }
}
