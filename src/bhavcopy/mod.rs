//! Bhavcopy pipeline components
//!
//! ```text
//! DateKey --> fetcher --> extractor --> parser --> db::sqlite (loader)
//! ```
//!
//! Each stage depends on the previous stage's output and runs to completion
//! before the next one starts. Composition lives in
//! `services::ingest_service`.

pub mod date_key;
pub mod extractor;
pub mod fetcher;
pub mod parser;

pub use date_key::DateKey;
pub use fetcher::{ArchiveJob, ArchiveSource, HttpArchiveSource};
pub use parser::{BhavcopyFile, StockRecords};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One instrument's OHLC prices for one trading session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub code: String,
    pub name: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub date: Option<NaiveDate>,
}
