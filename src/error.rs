//! Application error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bhavcopy not available for {0}")]
    InvalidDate(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidDate(_) => "INVALID_DATE",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::CorruptArchive(_) => "CORRUPT_ARCHIVE",
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Filesystem(_) => "FILESYSTEM_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the API reports for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDate(_) | AppError::Validation(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Serializable error response for the dashboard
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        // Client errors carry their message; server faults stay generic.
        let error = match err {
            AppError::InvalidDate(_) => {
                "Invalid date. Bhavcopy not available for the specified date.".to_string()
            }
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            _ => "Internal Server Error".to_string(),
        };

        ErrorResponse {
            code: err.code().to_string(),
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_is_client_error() {
        let err = AppError::InvalidDate("010124".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "INVALID_DATE");
        assert!(body.error.contains("Bhavcopy not available"));
    }

    #[test]
    fn test_server_errors_do_not_leak_detail() {
        let err = AppError::Parse("row 12: OPEN=\"abc\" in /tmp/secret/EQ010124.CSV".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "PARSE_ERROR");
        assert_eq!(body.error, "Internal Server Error");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = AppError::Conflict("Stock is already in favorites.".to_string());
        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "Stock is already in favorites.");
    }
}
