//! # Bundle Freshness
//!
//! Fingerprinting and the two-tier freshness check used on the request path.

pub mod fingerprint;
pub mod freshness_cache;
pub mod tracker;

pub use fingerprint::{bundle_fingerprint, cache_key, sha256_hex};
pub use freshness_cache::{FreshnessCache, InMemoryFreshnessCache};
pub use tracker::FreshnessTracker;
