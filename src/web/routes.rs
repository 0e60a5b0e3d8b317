//! Router assembly.

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::web::{handlers, state::AppState};

const BUNDLE_ROUTE: &str = "/{startpage_version}/{name}/{version}/{appbuildid}/{build_target}/{locale}/{channel}/{os_version}/{distribution}/{distribution_version}";

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Client-facing bundle lookup, with and without the trailing slash
pub fn bundle_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(BUNDLE_ROUTE, get(handlers::bundles::fetch_bundle))
        .route(
            &format!("{BUNDLE_ROUTE}/"),
            get(handlers::bundles::fetch_bundle),
        )
}

/// Anything else is looked up as a stored artifact (local backend only)
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(bundle_routes())
        .fallback(handlers::objects::serve_object)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
