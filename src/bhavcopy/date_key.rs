//! Session date keys
//!
//! The exchange identifies a bhavcopy by a 6-digit `ddmmyy` key, while the
//! database stores ISO `yyyy-mm-dd` dates. Two-digit years always map to
//! `20YY`, so only dates in 2000..=2099 are representable.

use crate::error::{AppError, Result};
use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Calendar date of one trading session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a date, rejecting years a two-digit key cannot round-trip
    pub fn new(date: NaiveDate) -> Result<Self> {
        if !(2000..=2099).contains(&date.year()) {
            return Err(AppError::Validation(format!(
                "Date {} is outside the supported range 2000-2099",
                date
            )));
        }
        Ok(Self(date))
    }

    /// Parse a `ddmmyy` key such as `150324`
    pub fn parse_ddmmyy(key: &str) -> Result<Self> {
        let invalid = || {
            AppError::Validation(format!(
                "Invalid date '{}'. Please provide a date in the format ddmmyy.",
                key
            ))
        };

        if key.len() != 6 || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let day: u32 = key[0..2].parse().map_err(|_| invalid())?;
        let month: u32 = key[2..4].parse().map_err(|_| invalid())?;
        let year: i32 = key[4..6].parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(2000 + year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }

    /// Derive the session date from an extracted file name like `EQ150324.CSV`
    ///
    /// The `EQ<ddmmyy>.CSV` pattern may appear anywhere in the name.
    pub fn from_csv_filename(file_name: &str) -> Option<Self> {
        file_name.match_indices("EQ").find_map(|(idx, _)| {
            let rest = &file_name[idx + 2..];
            let digits = rest.get(0..6)?;
            if rest.get(6..10)? != ".CSV" {
                return None;
            }
            Self::parse_ddmmyy(digits).ok()
        })
    }

    /// The `days` calendar dates strictly before `anchor`, most recent first
    pub fn lookback(anchor: NaiveDate, days: u32) -> Vec<DateKey> {
        (1..=u64::from(days))
            .filter_map(|offset| anchor.checked_sub_days(Days::new(offset)))
            .filter_map(|date| DateKey::new(date).ok())
            .collect()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Key used in remote URLs and file names
    pub fn ddmmyy(&self) -> String {
        self.0.format("%d%m%y").to_string()
    }

    /// Key used in the `stock_data.date` column
    pub fn storage_date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Name of the remote ZIP archive
    pub fn archive_name(&self) -> String {
        format!("EQ{}_CSV.ZIP", self.ddmmyy())
    }

    /// Name of the CSV inside the archive
    pub fn csv_name(&self) -> String {
        format!("EQ{}.CSV", self.ddmmyy())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ddmmyy())
    }
}

impl FromStr for DateKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_ddmmyy(s.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ddmmyy() {
        let key = DateKey::parse_ddmmyy("150324").unwrap();
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(key.storage_date(), "2024-03-15");
    }

    #[test]
    fn test_round_trip_reconstructs_century() {
        let dates = [
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2009, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2099, 7, 4).unwrap(),
        ];
        for date in dates {
            let key = DateKey::new(date).unwrap();
            let parsed: DateKey = key.ddmmyy().parse().unwrap();
            assert_eq!(parsed.date(), date);
        }
    }

    #[test]
    fn test_rejects_malformed_keys() {
        for bad in ["", "15032", "1503245", "15-324", "abcdef", "320124", "151324", "290223"] {
            assert!(
                matches!(DateKey::parse_ddmmyy(bad), Err(AppError::Validation(_))),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_unrepresentable_year() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert!(DateKey::new(date).is_err());
    }

    #[test]
    fn test_names() {
        let key = DateKey::parse_ddmmyy("050124").unwrap();
        assert_eq!(key.archive_name(), "EQ050124_CSV.ZIP");
        assert_eq!(key.csv_name(), "EQ050124.CSV");
        assert_eq!(key.to_string(), "050124");
    }

    #[test]
    fn test_date_from_csv_filename() {
        let key = DateKey::from_csv_filename("EQ150324.CSV").unwrap();
        assert_eq!(key.storage_date(), "2024-03-15");

        let prefixed = DateKey::from_csv_filename("backup_EQ010224.CSV").unwrap();
        assert_eq!(prefixed.storage_date(), "2024-02-01");

        assert!(DateKey::from_csv_filename("EQ150324_CSV.ZIP").is_none());
        assert!(DateKey::from_csv_filename("EQ150324.csv").is_none());
        assert!(DateKey::from_csv_filename("notes.txt").is_none());
        assert!(DateKey::from_csv_filename("EQ999999.CSV").is_none());
    }

    #[test]
    fn test_lookback_excludes_anchor() {
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let keys = DateKey::lookback(anchor, 3);

        let dates: Vec<String> = keys.iter().map(|k| k.storage_date()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-29", "2024-02-28"]);
    }

    #[test]
    fn test_lookback_zero_days() {
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert!(DateKey::lookback(anchor, 0).is_empty());
    }
}
