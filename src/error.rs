// Error types module

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::watermark::WatermarkError;

/// Centralized error type for the HTTP handlers
///
/// Engine failures keep their own classification; the remaining variants
/// cover malformed requests and server-side faults outside the engine.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Decode or write failure from the watermark engine
    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    /// Missing multipart field, unparseable query, etc.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Task join failures, unreadable output files, and so on
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Watermark(err) => StatusCode::from_u16(err.to_http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Watermark(WatermarkError::DecodeError(_)) => "DECODE_ERROR",
            ApiError::Watermark(WatermarkError::WriteError { .. }) => "WRITE_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Watermark(WatermarkError::WriteError { .. }) | ApiError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "An internal error occurred".to_string()
            }
            other => {
                tracing::warn!(error = %other, "Rejected request");
                other.to_string()
            }
        };

        let body = json!({
            "error": message,
            "code": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
