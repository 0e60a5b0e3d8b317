//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::{SnippetsConfig, StorageBackend};
use crate::services::BundleService;
use crate::storage::BundleStorage;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BundleService>,
    /// `Cache-Control: max-age` for redirect responses
    pub redirect_cache_seconds: u64,
    /// Storage served back over HTTP when bundles live on local disk
    pub object_storage: Option<Arc<dyn BundleStorage>>,
}

impl AppState {
    pub fn new(service: Arc<BundleService>, config: &SnippetsConfig) -> Self {
        let object_storage = match config.bundles.storage_backend {
            StorageBackend::Local => Some(service.storage().clone()),
            StorageBackend::Memory => None,
        };
        Self {
            service,
            redirect_cache_seconds: config.server.redirect_cache_seconds,
            object_storage,
        }
    }

    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.redirect_cache_seconds)
    }
}
