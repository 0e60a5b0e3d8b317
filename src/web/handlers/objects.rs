//! Serves stored bundle artifacts for the local-disk backend.

use axum::extract::State;
use axum::http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::debug;

use crate::error::SnippetsError;
use crate::storage::{is_internal_key, StorageError};
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// `GET /<object key>`
///
/// Returns the object bytes with the content type and encoding recorded at
/// write time, so Brotli artifacts reach clients with `Content-Encoding: br`.
pub async fn serve_object(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ApiError> {
    let Some(storage) = state.object_storage.as_ref() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let key = uri.path().trim_start_matches('/');
    if key.is_empty() || is_internal_key(key) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let object = match storage.read(key).await {
        Ok(object) => object,
        Err(StorageError::NotFound { .. } | StorageError::InvalidPath { .. }) => {
            debug!(key = %key, "No stored object");
            return Ok(StatusCode::NOT_FOUND.into_response());
        }
        Err(err) => return Err(SnippetsError::from(err).into()),
    };

    let mut response = (
        StatusCode::OK,
        [(CONTENT_TYPE, object.metadata.content_type)],
        object.data,
    )
        .into_response();
    if let Some(encoding) = object
        .metadata
        .content_encoding
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
    {
        response.headers_mut().insert(CONTENT_ENCODING, encoding);
    }
    Ok(response)
}
