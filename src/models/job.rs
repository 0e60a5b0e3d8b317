//! Jobs: one content item scheduled under one Target.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::metrics_never_updated;
use crate::state_machine::JobStatus;

/// Usage counters tracked by the analytics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Impressions,
    Clicks,
    Blocks,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Impressions, Metric::Clicks, Metric::Blocks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Impressions => "impressions",
            Self::Clicks => "clicks",
            Self::Blocks => "blocks",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global usage limits; 0 means unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobLimits {
    pub impressions: i64,
    pub clicks: i64,
    pub blocks: i64,
}

impl JobLimits {
    pub fn get(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Impressions => self.impressions,
            Metric::Clicks => self.clicks,
            Metric::Blocks => self.blocks,
        }
    }

    pub fn any(&self) -> bool {
        Metric::ALL.iter().any(|m| self.get(*m) > 0)
    }
}

/// Accumulated counters, written by the analytics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetrics {
    pub impressions: i64,
    pub clicks: i64,
    pub blocks: i64,
    /// [`metrics_never_updated`] until the first ingestion
    pub last_update: DateTime<Utc>,
}

impl Default for JobMetrics {
    fn default() -> Self {
        Self {
            impressions: 0,
            clicks: 0,
            blocks: 0,
            last_update: metrics_never_updated(),
        }
    }
}

impl JobMetrics {
    pub fn get(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Impressions => self.impressions,
            Metric::Clicks => self.clicks,
            Metric::Blocks => self.blocks,
        }
    }

    pub fn ever_updated(&self) -> bool {
        self.last_update > metrics_never_updated()
    }
}

/// Per-client frequency caps rendered into the payload; 0 means none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientLimits {
    pub lifetime: i32,
    pub per_hour: i32,
    pub per_day: i32,
    pub per_week: i32,
    pub per_fortnight: i32,
    pub per_month: i32,
}

impl ClientLimits {
    /// `(period_ms, cap)` pairs for the capped periods
    pub fn custom_periods(&self) -> Vec<(i64, i32)> {
        const HOUR_MS: i64 = 3_600_000;
        [
            (HOUR_MS, self.per_hour),
            (24 * HOUR_MS, self.per_day),
            (7 * 24 * HOUR_MS, self.per_week),
            (14 * 24 * HOUR_MS, self.per_fortnight),
            (30 * 24 * HOUR_MS, self.per_month),
        ]
        .into_iter()
        .filter(|(_, cap)| *cap > 0)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub snippet_id: i64,
    pub target_id: i64,
    pub distribution_id: i64,
    pub status: JobStatus,
    pub publish_start: Option<DateTime<Utc>>,
    pub publish_end: Option<DateTime<Utc>>,
    /// Relative display weight, 1..=100
    pub weight: i32,
    pub campaign: Option<String>,
    pub limits: JobLimits,
    pub metrics: JobMetrics,
    pub client_limits: ClientLimits,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Job {
    /// Draft job with default weight and no limits
    pub fn new(id: i64, snippet_id: i64, target_id: i64, distribution_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            snippet_id,
            target_id,
            distribution_id,
            status: JobStatus::Draft,
            publish_start: None,
            publish_end: None,
            weight: 100,
            campaign: None,
            limits: JobLimits::default(),
            metrics: JobMetrics::default(),
            client_limits: ClientLimits::default(),
            created: now,
            modified: now,
        }
    }

    /// Scheduled and `publish_start` (if any) at or before `cutoff`
    pub fn ready_to_publish(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == JobStatus::Scheduled && self.publish_start.map_or(true, |start| start <= cutoff)
    }

    /// Published and `publish_end` at or before `now`
    pub fn publication_ended(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Published && self.publish_end.is_some_and(|end| end <= now)
    }

    /// Published with a nonzero limit on `metric` that the counter has reached
    pub fn limit_reached(&self, metric: Metric) -> bool {
        let limit = self.limits.get(metric);
        self.status == JobStatus::Published && limit > 0 && self.metrics.get(metric) >= limit
    }

    /// Published, limited, metrics seen before, but silent for longer than `window`
    pub fn metrics_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.status == JobStatus::Published
            && self.limits.any()
            && self.metrics.ever_updated()
            && self.metrics.last_update < now - window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> Job {
        let mut job = Job::new(1, 1, 1, 1, Utc::now());
        job.status = status;
        job
    }

    #[test]
    fn test_ready_to_publish_without_start() {
        let now = Utc::now();
        assert!(job(JobStatus::Scheduled).ready_to_publish(now));
        assert!(!job(JobStatus::Draft).ready_to_publish(now));

        let mut future = job(JobStatus::Scheduled);
        future.publish_start = Some(now + Duration::hours(1));
        assert!(!future.ready_to_publish(now));
    }

    #[test]
    fn test_limit_zero_is_unlimited() {
        let mut j = job(JobStatus::Published);
        j.metrics.clicks = 1_000_000;
        assert!(!j.limit_reached(Metric::Clicks));
        j.limits.clicks = 100;
        assert!(j.limit_reached(Metric::Clicks));
        assert!(!j.limit_reached(Metric::Impressions));
    }

    #[test]
    fn test_never_updated_metrics_are_not_stale() {
        let now = Utc::now();
        let mut j = job(JobStatus::Published);
        j.limits.impressions = 10;
        assert!(!j.metrics_stale(now, Duration::hours(24)));

        j.metrics.last_update = now - Duration::hours(25);
        assert!(j.metrics_stale(now, Duration::hours(24)));

        j.metrics.last_update = now - Duration::hours(2);
        assert!(!j.metrics_stale(now, Duration::hours(24)));
    }

    #[test]
    fn test_custom_periods_skip_uncapped() {
        let limits = ClientLimits {
            lifetime: 5,
            per_day: 2,
            per_month: 4,
            ..Default::default()
        };
        assert_eq!(
            limits.custom_periods(),
            vec![(86_400_000, 2), (2_592_000_000, 4)]
        );
    }
}
