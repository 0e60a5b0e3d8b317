//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::SnippetsError;
use crate::logging::log_error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bundle unavailable: {message}")]
    BundleUnavailable { message: String },
}

impl From<SnippetsError> for ApiError {
    fn from(err: SnippetsError) -> Self {
        log_error("web", "fetch_bundle", &err.to_string(), None);
        Self::BundleUnavailable {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code, message) = match &self {
            ApiError::BundleUnavailable { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BUNDLE_UNAVAILABLE",
                "Bundle could not be generated",
            ),
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });
        (status_code, Json(body)).into_response()
    }
}
