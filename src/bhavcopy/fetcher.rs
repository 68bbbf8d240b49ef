//! Archive download
//!
//! Resolves a session date to the exchange's ZIP URL and streams the
//! response body straight to disk. A 404 from the exchange means no
//! bhavcopy was published for that date (weekend, holiday) and is reported
//! as `AppError::InvalidDate` rather than a transport failure.

use crate::bhavcopy::DateKey;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

const ARCHIVE_PATH: &str = "download/BhavCopy/Equity";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; bhavcopy-server)";

/// Source of daily bhavcopy archives
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Remote location of the archive for `key`
    fn archive_url(&self, key: &DateKey) -> String;

    /// Download the archive for `key` into `dest`, returning the written path
    async fn fetch(&self, key: &DateKey, dest: &Path) -> Result<PathBuf>;
}

/// Exchange archive source over HTTP
pub struct HttpArchiveSource {
    client: Client,
    base_url: Url,
}

impl HttpArchiveSource {
    /// Create a source rooted at `base_url` (e.g. `https://www.bseindia.com`)
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveSource {
    fn archive_url(&self, key: &DateKey) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            ARCHIVE_PATH,
            key.archive_name()
        )
    }

    async fn fetch(&self, key: &DateKey, dest: &Path) -> Result<PathBuf> {
        let url = self.archive_url(key);
        info!("Downloading {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::InvalidDate(key.to_string()));
        }
        let mut response = response.error_for_status()?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        info!("Downloaded {} bytes to {:?}", written, dest);
        Ok(dest.to_path_buf())
    }
}

/// One fetch-extract cycle for a single date
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub key: DateKey,
    pub url: String,
    pub archive_path: PathBuf,
    pub extract_dir: PathBuf,
}

impl ArchiveJob {
    pub fn new(source: &dyn ArchiveSource, key: DateKey, archive_path: PathBuf, extract_dir: PathBuf) -> Self {
        Self {
            url: source.archive_url(&key),
            key,
            archive_path,
            extract_dir,
        }
    }

    /// Path the archive's CSV lands at once extracted
    pub fn csv_path(&self) -> PathBuf {
        self.extract_dir.join(self.key.csv_name())
    }

    /// Remove the downloaded archive; a file that is already gone is fine
    pub async fn cleanup(&self) {
        match tokio::fs::remove_file(&self.archive_path).await {
            Ok(()) => info!("Deleted {:?}", self.archive_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("{:?} does not exist", self.archive_path)
            }
            Err(e) => warn!("Failed to delete {:?}: {}", self.archive_path, e),
        }
    }
}
