//! Repository seam between the engines and the relational store.
//!
//! Matching and generation work on a materialized [`Catalog`]. The
//! reconciler works inside a [`LifecycleTransaction`]: every status change
//! it makes is staged and becomes visible to other readers only on commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Catalog, Job, JobLogEntry};
use crate::state_machine::{JobEvent, JobStatus, StateMachineError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Job {job_id} not found")]
    JobNotFound { job_id: i64 },

    #[error("Invalid stored value for {field}: {value}")]
    InvalidData { field: String, value: String },

    #[error(transparent)]
    Transition(#[from] StateMachineError),
}

impl RepositoryError {
    pub fn invalid_data(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Counter snapshot pushed by the analytics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsUpdate {
    pub impressions: i64,
    pub clicks: i64,
    pub blocks: i64,
    pub observed_at: DateTime<Utc>,
}

/// A status change about to be applied and logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange<'a> {
    pub event: JobEvent,
    pub actor: &'a str,
    pub reason: &'a str,
    pub at: DateTime<Utc>,
}

/// Atomic unit of lifecycle work. Dropping without `commit` discards it.
#[async_trait]
pub trait LifecycleTransaction: Send {
    /// Jobs currently in `status`, as seen inside this transaction
    async fn jobs_with_status(&mut self, status: JobStatus) -> RepositoryResult<Vec<Job>>;

    /// Validate and apply one transition, writing a log entry. Returns the new status.
    async fn change_status(
        &mut self,
        job_id: i64,
        change: StatusChange<'_>,
    ) -> RepositoryResult<JobStatus>;

    async fn commit(self: Box<Self>) -> RepositoryResult<()>;

    async fn rollback(self: Box<Self>) -> RepositoryResult<()>;
}

#[async_trait]
pub trait SnippetRepository: Send + Sync + 'static {
    /// Snapshot every job with its references, plus distribution bundles
    async fn load_catalog(&self) -> RepositoryResult<Catalog>;

    async fn begin_lifecycle(&self) -> RepositoryResult<Box<dyn LifecycleTransaction>>;

    /// Overwrite a job's counters and stamp `metric_last_update`
    async fn record_metrics(&self, job_id: i64, update: MetricsUpdate) -> RepositoryResult<()>;

    /// Log entries for a job, oldest first
    async fn job_logs(&self, job_id: i64) -> RepositoryResult<Vec<JobLogEntry>>;

    /// Editor-driven transition (schedule, unschedule, cancel, ...) in its own transaction
    async fn apply_event(
        &self,
        job_id: i64,
        event: JobEvent,
        actor: &str,
    ) -> RepositoryResult<JobStatus> {
        let mut tx = self.begin_lifecycle().await?;
        let reason = event.default_reason();
        let change = StatusChange {
            event,
            actor,
            reason: &reason,
            at: Utc::now(),
        };
        match tx.change_status(job_id, change).await {
            Ok(status) => {
                tx.commit().await?;
                Ok(status)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }
}
