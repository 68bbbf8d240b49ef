//! Shared fixtures for unit tests

use crate::bhavcopy::{ArchiveSource, DateKey};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

pub const HEADER: &str =
    "SC_CODE,SC_NAME,SC_GROUP,SC_TYPE,OPEN,HIGH,LOW,CLOSE,LAST,PREVCLOSE,NO_TRADES\n";

/// A small but realistic bhavcopy body (header included)
pub fn sample_csv() -> String {
    format!(
        "{}{}",
        HEADER,
        "500325,RELIANCE                 ,A ,Q,2500.00,2550.00,2490.00,2530.00,2530.00,2495.00,1200\n\
         500180,HDFC BANK                ,A ,Q,1450.00,1460.00,1440.00,1455.00,1455.00,1449.00,900\n\
         500112,SBIN                     ,A ,Q,760.00,790.00,755.00,785.00,785.00,758.00,800\n\
         500209,INFY                     ,A ,Q,,1500.00,1480.00,1490.00,1490.00,1485.00,700\n"
    )
}

/// Build an in-memory ZIP holding the given `(name, contents)` entries
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// ZIP as the exchange publishes it for `ddmmyy`
pub fn bhavcopy_zip(ddmmyy: &str, csv: &str) -> Vec<u8> {
    zip_bytes(&[(&format!("EQ{}.CSV", ddmmyy), csv)])
}

/// Archive source serving fixed bytes per `ddmmyy`; unknown dates are unpublished
#[derive(Default)]
pub struct FakeArchiveSource {
    archives: HashMap<String, Vec<u8>>,
}

impl FakeArchiveSource {
    pub fn with(mut self, ddmmyy: &str, bytes: Vec<u8>) -> Self {
        self.archives.insert(ddmmyy.to_string(), bytes);
        self
    }
}

#[async_trait]
impl ArchiveSource for FakeArchiveSource {
    fn archive_url(&self, key: &DateKey) -> String {
        format!("memory://{}", key.archive_name())
    }

    async fn fetch(&self, key: &DateKey, dest: &Path) -> Result<PathBuf> {
        let bytes = self
            .archives
            .get(&key.ddmmyy())
            .ok_or_else(|| AppError::InvalidDate(key.to_string()))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, bytes).await?;
        Ok(dest.to_path_buf())
    }
}

/// Config rooted at a scratch directory with startup backfill disabled
pub fn test_config(data_dir: &Path) -> AppConfig {
    let data_dir = data_dir.to_string_lossy().to_string();
    AppConfig::from_lookup(|key| match key {
        "BHAVCOPY_DATA_DIR" => Some(data_dir.clone()),
        "BHAVCOPY_LOOKBACK_DAYS" => Some("0".to_string()),
        _ => None,
    })
    .unwrap()
}
