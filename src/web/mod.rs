//! # Web Front Door
//!
//! axum router that redirects clients to their bundle.

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use routes::create_router;
pub use state::AppState;
