//! Snippet bundle front door.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::debug;

use crate::models::Client;
use crate::services::ResolvedBundle;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// `GET /{startpage_version}/{name}/{version}/{appbuildid}/{build_target}/{locale}/{channel}/{os_version}/{distribution}/{distribution_version}/`
///
/// Redirects (302) to the bundle for this client. An empty match set is
/// answered with `{}` directly.
pub async fn fetch_bundle(
    State(state): State<Arc<AppState>>,
    Path(client): Path<Client>,
) -> Result<Response, ApiError> {
    debug!(
        locale = %client.locale,
        channel = %client.channel,
        distribution = %client.distribution,
        "Resolving bundle"
    );

    let cache_control = state.cache_control();
    let response = match state.service.resolve(&client).await? {
        ResolvedBundle::Redirect(url) => (
            StatusCode::FOUND,
            [(LOCATION, url), (CACHE_CONTROL, cache_control)],
        )
            .into_response(),
        ResolvedBundle::Empty => (
            StatusCode::OK,
            [(CACHE_CONTROL, cache_control)],
            Json(serde_json::json!({})),
        )
            .into_response(),
    };
    Ok(response)
}
