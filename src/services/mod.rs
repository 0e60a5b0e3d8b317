//! # Services
//!
//! Request-path coordination of the repository, generator and caches.

pub mod bundle_service;

pub use bundle_service::{BundleService, ResolvedBundle, ServiceSettings};
