//! Runtime configuration
//!
//! | Env Var | Default | Purpose |
//! |---------|---------|---------|
//! | `BHAVCOPY_HOST` | `127.0.0.1` | Bind host |
//! | `BHAVCOPY_PORT` | `3000` | Bind port |
//! | `BHAVCOPY_DATA_DIR` | `./data` | Database and downloaded files |
//! | `BHAVCOPY_DB_PATH` | `<data>/stocks.db` | SQLite database file |
//! | `BHAVCOPY_BASE_URL` | `https://www.bseindia.com` | Exchange host serving archives |
//! | `BHAVCOPY_LOOKBACK_DAYS` | `50` | Days downloaded at startup (0 disables) |
//! | `BHAVCOPY_FETCH_TIMEOUT_SECS` | (none) | Per-request download timeout |
//!
//! A `.env` file in the working directory is honoured.

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BASE_URL: &str = "https://www.bseindia.com";
const DEFAULT_LOOKBACK_DAYS: u32 = 50;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub base_url: Url,
    pub lookback_days: u32,
    pub fetch_timeout: Option<Duration>,
}

impl AppConfig {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("BHAVCOPY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_var("BHAVCOPY_PORT", get("BHAVCOPY_PORT"))?.unwrap_or(DEFAULT_PORT);

        let data_dir = get("BHAVCOPY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let db_path = get("BHAVCOPY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("stocks.db"));

        let base_url = get("BHAVCOPY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("Invalid BHAVCOPY_BASE_URL '{}': {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "BHAVCOPY_BASE_URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let lookback_days = parse_var("BHAVCOPY_LOOKBACK_DAYS", get("BHAVCOPY_LOOKBACK_DAYS"))?
            .unwrap_or(DEFAULT_LOOKBACK_DAYS);
        let fetch_timeout = parse_var::<u64>(
            "BHAVCOPY_FETCH_TIMEOUT_SECS",
            get("BHAVCOPY_FETCH_TIMEOUT_SECS"),
        )?
        .map(Duration::from_secs);

        Ok(Self {
            host,
            port,
            data_dir,
            db_path,
            base_url,
            lookback_days,
            fetch_timeout,
        })
    }

    /// Socket address the API server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address {}:{}: {}", self.host, self.port, e)))
    }

    /// Scratch space for the single-date archive
    pub fn work_dir(&self) -> PathBuf {
        self.data_dir.join("work")
    }

    /// Where single-date archives are unpacked
    pub fn extract_dir(&self) -> PathBuf {
        self.data_dir.join("extracted_data")
    }

    /// One extracted CSV per downloaded date, kept across runs
    pub fn bhavcopy_dir(&self) -> PathBuf {
        self.data_dir.join("bhavcopy_files")
    }

    /// Create every directory the service writes to
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.work_dir(), self.extract_dir(), self.bhavcopy_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", key, v, e)))
        })
        .transpose()
}
