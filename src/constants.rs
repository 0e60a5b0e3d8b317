//! # System Constants
//!
//! Channel names, lifecycle reason strings and bundle layout constants shared
//! by the matching engine, the reconciler and the bundle generator.

use chrono::{DateTime, TimeZone, Utc};

pub use crate::state_machine::JobStatus;

/// Logical release channels, in the order used to resolve raw channel strings.
pub mod channels {
    pub const NIGHTLY: &str = "nightly";
    pub const AURORA: &str = "aurora";
    pub const BETA: &str = "beta";
    pub const RELEASE: &str = "release";
    pub const ESR: &str = "esr";

    /// Prefix-match order for raw client channels (`release-cck-mozilla14` -> `release`).
    pub const RESOLUTION_ORDER: [&str; 5] = [NIGHTLY, AURORA, BETA, RELEASE, ESR];

    /// Raw channel reported by local builds; served as nightly.
    pub const DEFAULT_ALIAS: &str = "default";

    /// Fallback when nothing in [`RESOLUTION_ORDER`] matches.
    pub const FALLBACK: &str = RELEASE;
}

/// Reasons recorded on job log entries by the reconciler.
pub mod reasons {
    pub const PUBLISH_START_REACHED: &str = "Published start date reached.";
    pub const PUBLISH_END_REACHED: &str = "Publication end date reached.";
    pub const MISSING_METRICS: &str = "Premature termination due to missing metrics.";

    /// `Limit reached: clicks` and friends.
    pub fn limit_reached(metric: &str) -> String {
        format!("Limit reached: {metric}")
    }
}

/// Actors recorded on job log entries.
pub mod actors {
    /// Actor attributed to every reconciler transition.
    pub const SYSTEM_BOT: &str = "snippets_bot";
}

/// Bundle path and encoding constants.
pub mod bundles {
    pub const PRODUCT: &str = "Firefox";
    pub const DEFAULT_DISTRIBUTION: &str = "default";
    pub const EXPERIMENT_PREFIX: &str = "experiment-";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const CONTENT_ENCODING_BROTLI: &str = "br";
    pub const EXTENSION: &str = "json";
}

/// Seconds in one day; default TTL for freshness flags and redirect caching.
pub const ONE_DAY_SECONDS: u64 = 86_400;

/// Value of `metric_last_update` for jobs never touched by the analytics pipeline.
pub fn metrics_never_updated() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_reason_format() {
        assert_eq!(reasons::limit_reached("clicks"), "Limit reached: clicks");
    }

    #[test]
    fn test_metrics_sentinel_is_epoch() {
        assert_eq!(metrics_never_updated().timestamp(), 0);
    }
}
