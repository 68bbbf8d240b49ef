//! Ingestion Service
//!
//! Composes the bhavcopy pipeline stages:
//!
//! ```text
//! Idle -> Fetching -> Extracting -> Parsing -> Loading -> Done
//!            \            \            \          \
//!             +------------+------------+----------+--> Failed
//! ```
//!
//! Every public entry point holds `AppState::ingest_lock`, so at most one
//! pipeline touches the work directories and tables at a time.

use crate::bhavcopy::{extractor, ArchiveJob, BhavcopyFile, DateKey, StockRecord};
use crate::error::{AppError, Result};
use crate::state::AppState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Fixed archive name for the single-date pipeline
const SNAPSHOT_ARCHIVE: &str = "equity_bhavcopy.zip";

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStage {
    Idle,
    Fetching,
    Extracting,
    Parsing,
    Loading,
    Done,
    Failed,
}

/// Outcome of a single-date snapshot ingest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResult {
    pub date: String,
    pub session_date: String,
    pub records: usize,
    pub skipped: usize,
}

/// Per-date status within a range download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Downloaded,
    NotPublished,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateOutcome {
    pub date: String,
    pub status: DateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a lookback download
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeResult {
    pub downloaded: usize,
    pub not_published: usize,
    pub failed: usize,
    pub dates: Vec<DateOutcome>,
}

/// Outcome of a historical store rebuild
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub files_scanned: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub rows_inserted: usize,
}

/// Ingestion service for business logic
pub struct IngestService;

impl IngestService {
    /// Replace the `stocks` snapshot with the bhavcopy for `key`.
    ///
    /// The downloaded archive is deleted whatever the outcome. A date the
    /// exchange has not published fails with `AppError::InvalidDate` and
    /// leaves the existing snapshot untouched.
    pub async fn ingest_single_date(state: &AppState, key: DateKey) -> Result<IngestResult> {
        let _guard = state.ingest_lock.lock().await;
        info!("IngestService::ingest_single_date - date={}", key);

        let job = ArchiveJob::new(
            state.source.as_ref(),
            key,
            state.config.work_dir().join(SNAPSHOT_ARCHIVE),
            state.config.extract_dir(),
        );

        let result = Self::run_snapshot(state, &job).await;
        match &result {
            Ok(summary) => {
                Self::advance(state, IngestStage::Done);
                info!(
                    "Snapshot for {} stored: {} records ({} rows skipped)",
                    key, summary.records, summary.skipped
                );
            }
            Err(AppError::InvalidDate(_)) => {
                Self::advance(state, IngestStage::Failed);
                warn!("No bhavcopy published for {}", key);
            }
            Err(e) => {
                let stage = state.get_ingest_stage();
                Self::advance(state, IngestStage::Failed);
                error!("Snapshot for {} failed while {:?}: {}", key, stage, e);
            }
        }

        job.cleanup().await;
        result
    }

    async fn run_snapshot(state: &AppState, job: &ArchiveJob) -> Result<IngestResult> {
        Self::fetch_and_extract(state, job).await?;

        Self::advance(state, IngestStage::Parsing);
        let (records, skipped) = Self::parse_file(job.csv_path(), None).await?;

        Self::advance(state, IngestStage::Loading);
        let stored = state.sqlite.load_snapshot(&records)?;

        Ok(IngestResult {
            date: job.key.ddmmyy(),
            session_date: job.key.storage_date(),
            records: stored,
            skipped,
        })
    }

    /// Download and unpack the bhavcopy of every date in the lookback window.
    ///
    /// Dates are tried most recent first. A date that fails for any reason
    /// is recorded and the loop moves on; the call itself only fails when
    /// the target directory cannot be created.
    pub async fn ingest_date_range(
        state: &AppState,
        anchor: NaiveDate,
        lookback_days: u32,
    ) -> Result<RangeResult> {
        let _guard = state.ingest_lock.lock().await;
        info!(
            "IngestService::ingest_date_range - anchor={}, lookback_days={}",
            anchor, lookback_days
        );

        let dir = state.config.bhavcopy_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Filesystem(format!("Cannot create {:?}: {}", dir, e))
        })?;

        let mut result = RangeResult::default();
        for key in DateKey::lookback(anchor, lookback_days) {
            let job = ArchiveJob::new(
                state.source.as_ref(),
                key,
                dir.join(key.archive_name()),
                dir.clone(),
            );

            let outcome = Self::fetch_and_extract(state, &job).await;
            job.cleanup().await;

            let (status, error) = match outcome {
                Ok(()) => {
                    result.downloaded += 1;
                    (DateStatus::Downloaded, None)
                }
                Err(AppError::InvalidDate(_)) => {
                    info!("No bhavcopy published for {}", key);
                    result.not_published += 1;
                    (DateStatus::NotPublished, None)
                }
                Err(e) => {
                    warn!("Skipping {}: {}", key, e);
                    result.failed += 1;
                    (DateStatus::Failed, Some(e.to_string()))
                }
            };

            result.dates.push(DateOutcome {
                date: key.ddmmyy(),
                status,
                error,
            });
        }

        Self::advance(state, IngestStage::Done);
        info!(
            "Lookback finished: {} downloaded, {} not published, {} failed",
            result.downloaded, result.not_published, result.failed
        );
        Ok(result)
    }

    /// Rebuild `stock_data` from every CSV in the bhavcopy directory
    pub async fn reconcile_historical_store(state: &AppState) -> Result<ReconcileResult> {
        let _guard = state.ingest_lock.lock().await;
        info!("IngestService::reconcile_historical_store");
        Self::reconcile(state, None).await
    }

    /// Rebuild `stock_data` keeping only rows whose name equals `stock_name`
    pub async fn ingest_range_for_named_stock(
        state: &AppState,
        stock_name: &str,
    ) -> Result<ReconcileResult> {
        let stock_name = stock_name.trim();
        if stock_name.is_empty() {
            return Err(AppError::Validation(
                "Missing stockName in the request body.".to_string(),
            ));
        }

        let _guard = state.ingest_lock.lock().await;
        info!("IngestService::ingest_range_for_named_stock - name={}", stock_name);
        Self::reconcile(state, Some(stock_name)).await
    }

    /// Clear the historical table once, then load each file in name order.
    /// A file that cannot be dated, parsed or stored is logged and skipped.
    async fn reconcile(state: &AppState, name_filter: Option<&str>) -> Result<ReconcileResult> {
        let dir = state.config.bhavcopy_dir();
        let files = Self::list_files(&dir)?;

        Self::advance(state, IngestStage::Loading);
        let cleared = state.sqlite.clear_historical()?;
        debug!("Cleared {} historical rows", cleared);

        let mut result = ReconcileResult::default();
        for path in files {
            result.files_scanned += 1;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let Some(key) = DateKey::from_csv_filename(&file_name) else {
                warn!("Cannot read a session date from {}; skipping", file_name);
                result.files_skipped += 1;
                continue;
            };

            let records = match Self::parse_file(path.clone(), name_filter.map(str::to_string)).await {
                Ok((records, _)) => records,
                Err(e) => {
                    warn!("Failed to parse {}: {}", file_name, e);
                    result.files_failed += 1;
                    continue;
                }
            };

            match state.sqlite.load_historical(&records, &key) {
                Ok(inserted) => {
                    result.files_loaded += 1;
                    result.rows_inserted += inserted;
                }
                Err(e) => {
                    warn!("Failed to store rows from {}: {}", file_name, e);
                    result.files_failed += 1;
                }
            }
        }

        Self::advance(state, IngestStage::Done);
        info!(
            "Historical store rebuilt: {} rows from {} of {} files",
            result.rows_inserted, result.files_loaded, result.files_scanned
        );
        Ok(result)
    }

    async fn fetch_and_extract(state: &AppState, job: &ArchiveJob) -> Result<()> {
        Self::advance(state, IngestStage::Fetching);
        state.source.fetch(&job.key, &job.archive_path).await?;

        Self::advance(state, IngestStage::Extracting);
        extractor::extract(&job.archive_path, &job.extract_dir).await?;
        Ok(())
    }

    /// Parse a CSV on the blocking pool, returning records and skipped-row count
    async fn parse_file(
        path: PathBuf,
        name_filter: Option<String>,
    ) -> Result<(Vec<StockRecord>, usize)> {
        tokio::task::spawn_blocking(move || -> Result<(Vec<StockRecord>, usize)> {
            let file = BhavcopyFile::open(&path)?;
            let mut records = file.records(name_filter.as_deref())?;
            let parsed = records.by_ref().collect::<Result<Vec<_>>>()?;
            Ok((parsed, records.skipped()))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Parse task failed: {}", e)))?
    }

    fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AppError::Filesystem(format!("Cannot read {:?}: {}", dir, e))
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn advance(state: &AppState, next: IngestStage) {
        debug!("Ingest stage {:?} -> {:?}", state.get_ingest_stage(), next);
        state.set_ingest_stage(next);
    }
}
