use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::layout::LayoutError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutputFormat(String),

    #[error("Font error: {0}")]
    Font(#[from] LayoutError),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::InvalidInput(format!("malformed multipart body: {}", e.body_text()))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::UnsupportedOutputFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Font(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Encode(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            AppError::UnsupportedOutputFormat(format) => (
                "UNSUPPORTED_OUTPUT_FORMAT",
                format!("Unsupported output format '{format}'; expected png, jpg, jpeg or webp"),
            ),
            AppError::Font(e) => {
                tracing::error!("Font load failure: {e}");
                ("FONT_LOAD_FAILURE", e.to_string())
            }
            AppError::Encode(msg) => {
                tracing::error!("Encode error: {msg}");
                (
                    "ENCODE_ERROR",
                    "The watermarked image could not be encoded".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
