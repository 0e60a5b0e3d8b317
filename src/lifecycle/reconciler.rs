//! # Job Lifecycle Reconciler
//!
//! Periodic sweep that moves jobs forward based on time and usage metrics.
//! Rules run in a fixed order inside one lifecycle transaction:
//!
//! 1. Scheduled → Published once `publish_start` is at or before `now - offset`
//! 2. Published → Completed once `publish_end` has passed
//! 3. Published → Completed when an impressions, clicks or blocks limit is reached
//! 4. Published → Completed when limited jobs have stale metrics
//!
//! Any error rolls the whole sweep back. Every rule only selects jobs that
//! still need the transition, so a repeated run with no time passing is a
//! no-op.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SnippetsConfig;
use crate::constants::{actors, reasons};
use crate::database::{LifecycleTransaction, SnippetRepository, StatusChange};
use crate::error::Result;
use crate::logging::log_job_transition;
use crate::models::{Job, Metric};
use crate::state_machine::{JobEvent, JobStatus};

/// Transitions made by one sweep, per rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileCounts {
    pub published: usize,
    pub publication_end: usize,
    pub limit_impressions: usize,
    pub limit_clicks: usize,
    pub limit_blocks: usize,
    pub missing_metrics: usize,
}

impl ReconcileCounts {
    pub fn total(&self) -> usize {
        self.published
            + self.publication_end
            + self.limit_impressions
            + self.limit_clicks
            + self.limit_blocks
            + self.missing_metrics
    }

    fn limit_mut(&mut self, metric: Metric) -> &mut usize {
        match metric {
            Metric::Impressions => &mut self.limit_impressions,
            Metric::Clicks => &mut self.limit_clicks,
            Metric::Blocks => &mut self.limit_blocks,
        }
    }
}

impl fmt::Display for ReconcileCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Published: {}", self.published)?;
        writeln!(f, "Completed (publication end): {}", self.publication_end)?;
        writeln!(f, "Completed (impressions limit): {}", self.limit_impressions)?;
        writeln!(f, "Completed (clicks limit): {}", self.limit_clicks)?;
        writeln!(f, "Completed (blocks limit): {}", self.limit_blocks)?;
        write!(f, "Completed (missing metrics): {}", self.missing_metrics)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcilerSettings {
    /// Clock-skew allowance subtracted from `now` before publishing
    pub publication_offset: Duration,
    /// Silence window after which limited jobs are completed
    pub metrics_staleness: Duration,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self::from_config(&SnippetsConfig::default())
    }
}

impl ReconcilerSettings {
    pub fn from_config(config: &SnippetsConfig) -> Self {
        Self {
            publication_offset: config.lifecycle.publication_offset(),
            metrics_staleness: config.lifecycle.metrics_staleness(),
        }
    }
}

pub struct JobReconciler {
    repository: Arc<dyn SnippetRepository>,
    settings: ReconcilerSettings,
}

impl JobReconciler {
    pub fn new(repository: Arc<dyn SnippetRepository>, settings: ReconcilerSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Run one sweep atomically
    pub async fn reconcile(&self, now: DateTime<Utc>) -> Result<ReconcileCounts> {
        let mut tx = self.repository.begin_lifecycle().await?;

        match self.sweep(tx.as_mut(), now).await {
            Ok(counts) => {
                tx.commit().await?;
                info!(
                    published = counts.published,
                    publication_end = counts.publication_end,
                    limit_impressions = counts.limit_impressions,
                    limit_clicks = counts.limit_clicks,
                    limit_blocks = counts.limit_blocks,
                    missing_metrics = counts.missing_metrics,
                    "Job reconciliation committed"
                );
                Ok(counts)
            }
            Err(err) => {
                warn!(error = %err, "Job reconciliation failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn sweep(
        &self,
        tx: &mut dyn LifecycleTransaction,
        now: DateTime<Utc>,
    ) -> Result<ReconcileCounts> {
        let mut counts = ReconcileCounts::default();

        let cutoff = now - self.settings.publication_offset;
        let ready = tx.jobs_with_status(JobStatus::Scheduled).await?;
        counts.published = self
            .apply(tx, ready.iter().filter(|j| j.ready_to_publish(cutoff)), now, || {
                (JobEvent::Publish, reasons::PUBLISH_START_REACHED.to_string())
            })
            .await?;

        let published = tx.jobs_with_status(JobStatus::Published).await?;
        counts.publication_end = self
            .apply(tx, published.iter().filter(|j| j.publication_ended(now)), now, || {
                complete(reasons::PUBLISH_END_REACHED.to_string())
            })
            .await?;

        for metric in Metric::ALL {
            let published = tx.jobs_with_status(JobStatus::Published).await?;
            *counts.limit_mut(metric) = self
                .apply(tx, published.iter().filter(|j| j.limit_reached(metric)), now, || {
                    complete(reasons::limit_reached(metric.as_str()))
                })
                .await?;
        }

        let window = self.settings.metrics_staleness;
        let published = tx.jobs_with_status(JobStatus::Published).await?;
        counts.missing_metrics = self
            .apply(tx, published.iter().filter(|j| j.metrics_stale(now, window)), now, || {
                complete(reasons::MISSING_METRICS.to_string())
            })
            .await?;

        Ok(counts)
    }

    async fn apply<'j, I, F>(
        &self,
        tx: &mut dyn LifecycleTransaction,
        jobs: I,
        now: DateTime<Utc>,
        event: F,
    ) -> Result<usize>
    where
        I: Iterator<Item = &'j Job> + Send,
        F: Fn() -> (JobEvent, String) + Send + Sync,
    {
        let mut applied = 0;
        for job in jobs {
            let (event, reason) = event();
            let from = job.status;
            let to = tx
                .change_status(
                    job.id,
                    StatusChange {
                        event,
                        actor: actors::SYSTEM_BOT,
                        reason: &reason,
                        at: now,
                    },
                )
                .await?;
            log_job_transition(job.id, from.as_str(), to.as_str(), actors::SYSTEM_BOT, &reason);
            applied += 1;
        }
        Ok(applied)
    }
}

fn complete(reason: String) -> (JobEvent, String) {
    (JobEvent::Complete(reason.clone()), reason)
}
