//! In-process repository.
//!
//! A lifecycle transaction takes the state lock for its whole lifetime and
//! works on a staged copy. Commit swaps the copy in; rollback or drop
//! discards it. Concurrent sweeps therefore serialize on the lock.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::repository::{
    LifecycleTransaction, MetricsUpdate, RepositoryError, RepositoryResult, SnippetRepository,
    StatusChange,
};
use crate::models::{
    Catalog, CatalogParts, Distribution, DistributionBundle, Job, JobLogEntry, Snippet, Target,
};
use crate::state_machine::{JobStateMachine, JobStatus};

#[derive(Debug, Clone, Default)]
struct RepositoryState {
    jobs: BTreeMap<i64, Job>,
    snippets: BTreeMap<i64, Snippet>,
    targets: BTreeMap<i64, Target>,
    distributions: BTreeMap<i64, Distribution>,
    distribution_bundles: BTreeMap<i64, DistributionBundle>,
    logs: Vec<JobLogEntry>,
}

impl RepositoryState {
    fn parts(&self) -> CatalogParts {
        CatalogParts {
            jobs: self.jobs.values().cloned().collect(),
            snippets: self.snippets.values().cloned().collect(),
            targets: self.targets.values().cloned().collect(),
            distributions: self.distributions.values().cloned().collect(),
            distribution_bundles: self.distribution_bundles.values().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<RepositoryState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from raw rows
    pub fn from_parts(parts: CatalogParts) -> Self {
        let state = RepositoryState {
            jobs: parts.jobs.into_iter().map(|j| (j.id, j)).collect(),
            snippets: parts.snippets.into_iter().map(|s| (s.id, s)).collect(),
            targets: parts.targets.into_iter().map(|t| (t.id, t)).collect(),
            distributions: parts.distributions.into_iter().map(|d| (d.id, d)).collect(),
            distribution_bundles: parts
                .distribution_bundles
                .into_iter()
                .map(|b| (b.id, b))
                .collect(),
            logs: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn upsert_job(&self, job: Job) {
        self.state.lock().await.jobs.insert(job.id, job);
    }

    pub async fn upsert_snippet(&self, snippet: Snippet) {
        self.state.lock().await.snippets.insert(snippet.id, snippet);
    }

    pub async fn upsert_target(&self, target: Target) {
        self.state.lock().await.targets.insert(target.id, target);
    }

    pub async fn upsert_distribution(&self, distribution: Distribution) {
        self.state
            .lock()
            .await
            .distributions
            .insert(distribution.id, distribution);
    }

    pub async fn upsert_distribution_bundle(&self, bundle: DistributionBundle) {
        self.state
            .lock()
            .await
            .distribution_bundles
            .insert(bundle.id, bundle);
    }

    pub async fn job(&self, job_id: i64) -> Option<Job> {
        self.state.lock().await.jobs.get(&job_id).cloned()
    }

    /// Mutate a job in place, as an editor would
    pub async fn update_job<F>(&self, job_id: i64, update: F) -> RepositoryResult<()>
    where
        F: FnOnce(&mut Job) + Send,
    {
        let mut state = self.state.lock().await;
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or(RepositoryError::JobNotFound { job_id })?;
        update(job);
        Ok(())
    }
}

#[async_trait]
impl SnippetRepository for InMemoryRepository {
    async fn load_catalog(&self) -> RepositoryResult<Catalog> {
        let parts = self.state.lock().await.parts();
        Ok(Catalog::assemble(parts))
    }

    async fn begin_lifecycle(&self) -> RepositoryResult<Box<dyn LifecycleTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryLifecycle { guard, staged }))
    }

    async fn record_metrics(&self, job_id: i64, update: MetricsUpdate) -> RepositoryResult<()> {
        let mut state = self.state.lock().await;
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or(RepositoryError::JobNotFound { job_id })?;
        job.metrics.impressions = update.impressions;
        job.metrics.clicks = update.clicks;
        job.metrics.blocks = update.blocks;
        job.metrics.last_update = update.observed_at;
        Ok(())
    }

    async fn job_logs(&self, job_id: i64) -> RepositoryResult<Vec<JobLogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .logs
            .iter()
            .filter(|entry| entry.job_id == job_id)
            .cloned()
            .collect())
    }
}

struct InMemoryLifecycle {
    guard: OwnedMutexGuard<RepositoryState>,
    staged: RepositoryState,
}

#[async_trait]
impl LifecycleTransaction for InMemoryLifecycle {
    async fn jobs_with_status(&mut self, status: JobStatus) -> RepositoryResult<Vec<Job>> {
        Ok(self
            .staged
            .jobs
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }

    async fn change_status(
        &mut self,
        job_id: i64,
        change: StatusChange<'_>,
    ) -> RepositoryResult<JobStatus> {
        let next_log_id = self.staged.logs.len() as i64 + 1;
        let job = self
            .staged
            .jobs
            .get_mut(&job_id)
            .ok_or(RepositoryError::JobNotFound { job_id })?;

        let from = job.status;
        let to = JobStateMachine::transition(from, &change.event)?;
        job.status = to;
        job.modified = change.at;

        self.staged.logs.push(JobLogEntry {
            id: next_log_id,
            job_id,
            actor: change.actor.to_string(),
            from_status: from,
            to_status: to,
            reason: change.reason.to_string(),
            created_at: change.at,
        });
        Ok(to)
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        debug!("Committed lifecycle transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        debug!("Rolled back lifecycle transaction");
        Ok(())
    }
}
