//! # Materialized Catalog
//!
//! Snapshot of jobs joined with their snippet, target and distribution, plus
//! the distribution bundles. Matching and bundle generation run on this
//! instead of live queries, so they stay testable without a database.
//!
//! [`JobScope`] gives the chainable, scope-style filtering used throughout:
//!
//! ```rust,ignore
//! let jobs = catalog.scope().published().on_channel("release").all();
//! ```

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

use super::{Distribution, DistributionBundle, Job, Snippet, Target};
use crate::matching::locale::locale_code_matches;
use crate::state_machine::JobStatus;

/// A job with its references resolved
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job: Job,
    pub snippet: Arc<Snippet>,
    pub target: Arc<Target>,
    pub distribution: Arc<Distribution>,
}

impl JobRecord {
    pub fn id(&self) -> i64 {
        self.job.id
    }

    /// Logical channels the job's target is on
    pub fn channels(&self) -> Vec<&'static str> {
        self.target.channels()
    }

    /// Locale prefixes from the snippet's locale code string
    pub fn locale_prefixes(&self) -> Vec<String> {
        self.snippet.locales()
    }
}

/// Raw rows handed over by a repository
#[derive(Debug, Clone, Default)]
pub struct CatalogParts {
    pub jobs: Vec<Job>,
    pub snippets: Vec<Snippet>,
    pub targets: Vec<Target>,
    pub distributions: Vec<Distribution>,
    pub distribution_bundles: Vec<DistributionBundle>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    jobs: Vec<JobRecord>,
    distribution_bundles: Vec<DistributionBundle>,
}

impl Catalog {
    /// Join rows into records. Jobs with dangling references are dropped
    /// with a warning instead of failing the whole snapshot.
    pub fn assemble(parts: CatalogParts) -> Self {
        let snippets: HashMap<i64, Arc<Snippet>> = parts
            .snippets
            .into_iter()
            .map(|s| (s.id, Arc::new(s)))
            .collect();
        let targets: HashMap<i64, Arc<Target>> = parts
            .targets
            .into_iter()
            .map(|t| (t.id, Arc::new(t)))
            .collect();
        let distributions: HashMap<i64, Arc<Distribution>> = parts
            .distributions
            .into_iter()
            .map(|d| (d.id, Arc::new(d)))
            .collect();

        let mut jobs: Vec<JobRecord> = parts
            .jobs
            .into_iter()
            .filter_map(|job| {
                let Some(snippet) = snippets.get(&job.snippet_id).cloned() else {
                    warn!(job_id = job.id, snippet_id = job.snippet_id, "Job references missing snippet");
                    return None;
                };
                let Some(target) = targets.get(&job.target_id).cloned() else {
                    warn!(job_id = job.id, target_id = job.target_id, "Job references missing target");
                    return None;
                };
                let Some(distribution) = distributions.get(&job.distribution_id).cloned() else {
                    warn!(job_id = job.id, distribution_id = job.distribution_id, "Job references missing distribution");
                    return None;
                };
                Some(JobRecord {
                    job,
                    snippet,
                    target,
                    distribution,
                })
            })
            .collect();
        jobs.sort_by_key(|record| record.job.id);

        let mut distribution_bundles = parts.distribution_bundles;
        distribution_bundles.sort_by_key(|bundle| bundle.id);

        Self {
            jobs,
            distribution_bundles,
        }
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn distribution_bundles(&self) -> &[DistributionBundle] {
        &self.distribution_bundles
    }

    pub fn job(&self, id: i64) -> Option<&JobRecord> {
        self.jobs.iter().find(|record| record.job.id == id)
    }

    pub fn distribution_bundle_by_code(&self, code_name: &str) -> Option<&DistributionBundle> {
        self.distribution_bundles
            .iter()
            .find(|bundle| bundle.code_name == code_name)
    }

    /// Start a chainable filter over every job
    pub fn scope(&self) -> JobScope<'_> {
        JobScope {
            records: self.jobs.iter().collect(),
            catalog: self,
        }
    }
}

/// Chainable in-memory filter over catalog jobs
#[derive(Debug, Clone)]
pub struct JobScope<'a> {
    records: Vec<&'a JobRecord>,
    catalog: &'a Catalog,
}

impl<'a> JobScope<'a> {
    fn retain(mut self, keep: impl Fn(&JobRecord) -> bool) -> Self {
        self.records.retain(|record| keep(record));
        self
    }

    pub fn with_status(self, status: JobStatus) -> Self {
        self.retain(|r| r.job.status == status)
    }

    pub fn published(self) -> Self {
        self.with_status(JobStatus::Published)
    }

    /// Target flag `on_<channel>` set
    pub fn on_channel(self, channel: &str) -> Self {
        self.retain(|r| r.target.applies_to_channel(channel))
    }

    pub fn in_distributions(self, distribution_ids: &[i64]) -> Self {
        let ids: HashSet<i64> = distribution_ids.iter().copied().collect();
        self.retain(|r| ids.contains(&r.job.distribution_id))
    }

    /// Snippet locale code contains the full locale or its language prefix
    pub fn for_locale(self, locale: &str) -> Self {
        self.retain(|r| locale_code_matches(&r.snippet.locale_code, locale))
    }

    /// Content, job, or a containing distribution bundle modified at or after `since`
    pub fn modified_since(self, since: DateTime<Utc>) -> Self {
        let touched_distributions: HashSet<i64> = self
            .catalog
            .distribution_bundles
            .iter()
            .filter(|bundle| bundle.modified >= since)
            .flat_map(|bundle| bundle.distribution_ids.iter().copied())
            .collect();

        self.retain(|r| {
            r.snippet.modified >= since
                || r.job.modified >= since
                || touched_distributions.contains(&r.job.distribution_id)
        })
    }

    pub fn ids(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.job.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn all(self) -> Vec<&'a JobRecord> {
        self.records
    }
}
