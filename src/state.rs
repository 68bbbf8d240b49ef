//! Application state management

use crate::bhavcopy::{ArchiveSource, HttpArchiveSource};
use crate::config::AppConfig;
use crate::db::sqlite::SqliteDb;
use crate::error::Result;
use crate::services::ingest_service::IngestStage;
use chrono::NaiveDate;
use chrono_tz::Asia::Kolkata;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across all handlers
pub struct AppState {
    /// Runtime configuration
    pub config: AppConfig,

    /// SQLite database connection
    pub sqlite: Arc<SqliteDb>,

    /// Where daily archives are downloaded from
    pub source: Arc<dyn ArchiveSource>,

    /// Held for the whole of any pipeline run
    pub ingest_lock: Mutex<()>,

    /// Stage of the pipeline currently (or last) running
    pub ingest_stage: RwLock<IngestStage>,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        config.ensure_dirs()?;

        tracing::info!("Data directory: {:?}", config.data_dir);

        let sqlite = Arc::new(SqliteDb::new(&config.db_path)?);
        let source = Arc::new(HttpArchiveSource::new(
            config.base_url.clone(),
            config.fetch_timeout,
        )?);

        Ok(Self::with_parts(config, sqlite, source))
    }

    /// Assemble state from already-built parts
    pub fn with_parts(
        config: AppConfig,
        sqlite: Arc<SqliteDb>,
        source: Arc<dyn ArchiveSource>,
    ) -> Self {
        Self {
            config,
            sqlite,
            source,
            ingest_lock: Mutex::new(()),
            ingest_stage: RwLock::new(IngestStage::Idle),
        }
    }

    /// Get current pipeline stage
    pub fn get_ingest_stage(&self) -> IngestStage {
        *self.ingest_stage.read()
    }

    /// Set current pipeline stage
    pub fn set_ingest_stage(&self, stage: IngestStage) {
        *self.ingest_stage.write() = stage;
    }

    /// Today's date on the exchange's calendar
    pub fn exchange_today() -> NaiveDate {
        chrono::Utc::now().with_timezone(&Kolkata).date_naive()
    }
}
