//! REST API types
//!
//! Query routes return bare JSON arrays, which is what the dashboard
//! consumes. Mutating routes answer with an `ApiMessage`.
//!
//! Note: stock codes are numeric on the exchange and the dashboard may send
//! them as numbers, so code fields accept both strings and numbers.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Custom Deserializers
// ============================================================================

/// Deserialize an optional value that can be a string or a number, as a string
fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleString {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<FlexibleString>::deserialize(deserializer)? {
        Some(FlexibleString::Str(s)) => Some(s),
        Some(FlexibleString::Int(i)) => Some(i.to_string()),
        Some(FlexibleString::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

/// Deserialize an optional day count that can be a number or a numeric string
fn deserialize_optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInt {
        Int(u32),
        Str(String),
    }

    match Option::<FlexibleInt>::deserialize(deserializer)? {
        Some(FlexibleInt::Int(i)) => Ok(Some(i)),
        Some(FlexibleInt::Str(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Message envelope for mutating routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiMessage<T> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Placeholder payload for messages without data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub ingest_stage: crate::services::IngestStage,
}

// ============================================================================
// Request Types
// ============================================================================

/// Single-date ingest request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessBhavcopyRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub date: Option<String>,
}

/// Favorite to add
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddFavoriteRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Historical rebuild for one stock
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchStockDataRequest {
    #[serde(default, rename = "stockName")]
    pub stock_name: Option<String>,
}

/// Lookback download request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadHistoryRequest {
    #[serde(default, rename = "lookbackDays", deserialize_with = "deserialize_optional_u32")]
    pub lookback_days: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_accepts_number_or_string() {
        let req: AddFavoriteRequest =
            serde_json::from_str(r#"{"code": 500325, "name": "RELIANCE"}"#).unwrap();
        assert_eq!(req.code.as_deref(), Some("500325"));

        let req: AddFavoriteRequest = serde_json::from_str(r#"{"code": "500325"}"#).unwrap();
        assert_eq!(req.code.as_deref(), Some("500325"));
        assert!(req.name.is_none());
    }

    #[test]
    fn test_date_keeps_leading_zero() {
        let req: ProcessBhavcopyRequest = serde_json::from_str(r#"{"date": "010224"}"#).unwrap();
        assert_eq!(req.date.as_deref(), Some("010224"));

        let req: ProcessBhavcopyRequest = serde_json::from_str("{}").unwrap();
        assert!(req.date.is_none());
    }

    #[test]
    fn test_lookback_days_flexible() {
        let req: DownloadHistoryRequest = serde_json::from_str(r#"{"lookbackDays": "7"}"#).unwrap();
        assert_eq!(req.lookback_days, Some(7));

        let req: DownloadHistoryRequest = serde_json::from_str(r#"{"lookbackDays": 30}"#).unwrap();
        assert_eq!(req.lookback_days, Some(30));

        assert!(serde_json::from_str::<DownloadHistoryRequest>(r#"{"lookbackDays": "x"}"#).is_err());
    }

    #[test]
    fn test_message_skips_empty_data() {
        let json = serde_json::to_string(&ApiMessage::<Empty>::new("ok")).unwrap();
        assert_eq!(json, r#"{"message":"ok"}"#);
    }
}
