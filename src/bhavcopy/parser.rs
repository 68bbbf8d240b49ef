//! Bhavcopy CSV parsing
//!
//! Rows are read lazily. A row with any of the six required columns missing
//! or blank is logged and skipped; a required column that is present but not
//! a finite number aborts the whole file with `AppError::Parse`. Fields are
//! decoded as UTF-8 lossily, so a stray Latin-1 byte only mangles its own
//! field.

use crate::bhavcopy::StockRecord;
use crate::error::{AppError, Result};
use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SC_CODE: &str = "SC_CODE";
const SC_NAME: &str = "SC_NAME";
const OPEN: &str = "OPEN";
const HIGH: &str = "HIGH";
const LOW: &str = "LOW";
const CLOSE: &str = "CLOSE";

/// An extracted bhavcopy CSV on disk
#[derive(Debug, Clone)]
pub struct BhavcopyFile {
    path: PathBuf,
}

impl BhavcopyFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::Filesystem(format!(
                "Bhavcopy file not found: {:?}",
                path
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream records from the start of the file.
    ///
    /// With `name_filter`, only rows whose trimmed `SC_NAME` equals the
    /// filter exactly are yielded. Every call re-opens the file.
    pub fn records(&self, name_filter: Option<&str>) -> Result<StockRecords> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let columns = Columns::from_headers(reader.byte_headers()?);
        if let Some(missing) = columns.first_missing() {
            warn!(
                "{:?} has no {} column; every row will be skipped",
                self.path, missing
            );
        }

        Ok(StockRecords {
            rows: reader.into_byte_records(),
            columns,
            name_filter: name_filter.map(str::to_string),
            path: self.path.clone(),
            skipped: 0,
            done: false,
        })
    }

    /// Parse the whole file, failing on the first fatal row
    pub fn read_all(&self, name_filter: Option<&str>) -> Result<Vec<StockRecord>> {
        self.records(name_filter)?.collect()
    }
}

/// Header positions of the required columns
#[derive(Debug, Clone, Copy)]
struct Columns {
    code: Option<usize>,
    name: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &ByteRecord) -> Self {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == column)
        };
        Self {
            code: find(SC_CODE),
            name: find(SC_NAME),
            open: find(OPEN),
            high: find(HIGH),
            low: find(LOW),
            close: find(CLOSE),
        }
    }

    fn first_missing(&self) -> Option<&'static str> {
        [
            (self.code, SC_CODE),
            (self.name, SC_NAME),
            (self.open, OPEN),
            (self.high, HIGH),
            (self.low, LOW),
            (self.close, CLOSE),
        ]
        .into_iter()
        .find(|(idx, _)| idx.is_none())
        .map(|(_, column)| column)
    }
}

/// Lazy iterator over the valid rows of a bhavcopy file
///
/// Yields `Err` at most once; iteration stops after a fatal error.
pub struct StockRecords {
    rows: ByteRecordsIntoIter<File>,
    columns: Columns,
    name_filter: Option<String>,
    path: PathBuf,
    skipped: usize,
    done: bool,
}

impl StockRecords {
    /// Rows dropped so far for missing fields
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_row(&mut self, row: &ByteRecord) -> Result<Option<StockRecord>> {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cols = self.columns;

        let fields = [
            (field(row, cols.code), SC_CODE),
            (field(row, cols.name), SC_NAME),
            (field(row, cols.open), OPEN),
            (field(row, cols.high), HIGH),
            (field(row, cols.low), LOW),
            (field(row, cols.close), CLOSE),
        ];
        if let Some((_, column)) = fields.iter().find(|(value, _)| value.is_none()) {
            self.skipped += 1;
            warn!("Skipping row {} of {:?}: missing {}", line, self.path, column);
            return Ok(None);
        }

        let [code, name, open, high, low, close] = fields.map(|(value, _)| value.unwrap_or_default());

        if let Some(filter) = &self.name_filter {
            if name != *filter {
                return Ok(None);
            }
        }

        // NaN and infinities parse as f64 but cannot be stored
        let number = |value: &str, column: &str| -> Result<f64> {
            value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    AppError::Parse(format!(
                        "{:?} line {}: {} value {:?} is not a number",
                        self.path, line, column, value
                    ))
                })
        };

        Ok(Some(StockRecord {
            open: number(&open, OPEN)?,
            high: number(&high, HIGH)?,
            low: number(&low, LOW)?,
            close: number(&close, CLOSE)?,
            code,
            name,
            date: None,
        }))
    }
}

/// Trimmed, non-empty value of a column, decoded lossily
fn field(row: &ByteRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Iterator for StockRecords {
    type Item = Result<StockRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let row = match self.rows.next() {
                Some(Ok(row)) => row,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    debug!("Finished {:?} ({} rows skipped)", self.path, self.skipped);
                    return None;
                }
            };

            match self.parse_row(&row) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
