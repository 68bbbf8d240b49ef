//! Services Layer
//!
//! Business logic called by the REST API handlers and the startup backfill.
//!
//! # Architecture
//!
//! ```text
//! Dashboard --> REST API ──┐
//!                          ├──> Services --> bhavcopy pipeline / SQLite
//! Startup backfill ────────┘
//! ```
//!
//! # Services
//!
//! - `IngestService` - Single-date snapshot, lookback download, historical rebuild
//! - `StockService` - Top movers, search, favorites, historical rows

pub mod ingest_service;
pub mod stock_service;

// Re-export commonly used types and services
pub use ingest_service::{IngestResult, IngestService, IngestStage, RangeResult, ReconcileResult};
pub use stock_service::StockService;
