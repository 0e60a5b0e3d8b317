//! PostgreSQL repository.
//!
//! Lifecycle transactions wrap a `sqlx::Transaction`; rows a sweep touches
//! are locked with `FOR UPDATE` so concurrent sweeps serialize per job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, info};

use super::repository::{
    LifecycleTransaction, MetricsUpdate, RepositoryError, RepositoryResult, SnippetRepository,
    StatusChange,
};
use crate::config::DatabaseConfig;
use crate::models::{
    Catalog, CatalogParts, ClientLimits, ClientMatchRule, Distribution, DistributionBundle, Job,
    JobLimits, JobLogEntry, JobMetrics, Snippet, Target, TargetFilter,
};
use crate::rendering::ContentTemplate;
use crate::state_machine::{JobStateMachine, JobStatus};

const JOB_COLUMNS: &str = "\
    id, snippet_id, target_id, distribution_id, status, publish_start, publish_end, \
    weight, campaign, limit_impressions, limit_clicks, limit_blocks, \
    metric_impressions, metric_clicks, metric_blocks, metric_last_update, \
    client_limit_lifetime, client_limit_per_hour, client_limit_per_day, \
    client_limit_per_week, client_limit_per_fortnight, client_limit_per_month, \
    created, modified";

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    snippet_id: i64,
    target_id: i64,
    distribution_id: i64,
    status: String,
    publish_start: Option<DateTime<Utc>>,
    publish_end: Option<DateTime<Utc>>,
    weight: i32,
    campaign: Option<String>,
    limit_impressions: i64,
    limit_clicks: i64,
    limit_blocks: i64,
    metric_impressions: i64,
    metric_clicks: i64,
    metric_blocks: i64,
    metric_last_update: DateTime<Utc>,
    client_limit_lifetime: i32,
    client_limit_per_hour: i32,
    client_limit_per_day: i32,
    client_limit_per_week: i32,
    client_limit_per_fortnight: i32,
    client_limit_per_month: i32,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        Ok(Job {
            id: row.id,
            snippet_id: row.snippet_id,
            target_id: row.target_id,
            distribution_id: row.distribution_id,
            status,
            publish_start: row.publish_start,
            publish_end: row.publish_end,
            weight: row.weight,
            campaign: row.campaign.filter(|c| !c.is_empty()),
            limits: JobLimits {
                impressions: row.limit_impressions,
                clicks: row.limit_clicks,
                blocks: row.limit_blocks,
            },
            metrics: JobMetrics {
                impressions: row.metric_impressions,
                clicks: row.metric_clicks,
                blocks: row.metric_blocks,
                last_update: row.metric_last_update,
            },
            client_limits: ClientLimits {
                lifetime: row.client_limit_lifetime,
                per_hour: row.client_limit_per_hour,
                per_day: row.client_limit_per_day,
                per_week: row.client_limit_per_week,
                per_fortnight: row.client_limit_per_fortnight,
                per_month: row.client_limit_per_month,
            },
            created: row.created,
            modified: row.modified,
        })
    }
}

#[derive(Debug, FromRow)]
struct SnippetRow {
    id: i64,
    name: String,
    locale_code: String,
    template: Json<ContentTemplate>,
    modified: DateTime<Utc>,
}

impl From<SnippetRow> for Snippet {
    fn from(row: SnippetRow) -> Self {
        Snippet {
            id: row.id,
            name: row.name,
            locale_code: row.locale_code,
            template: row.template.0,
            modified: row.modified,
        }
    }
}

#[derive(Debug, FromRow)]
struct TargetRow {
    id: i64,
    name: String,
    on_release: bool,
    on_beta: bool,
    on_aurora: bool,
    on_nightly: bool,
    on_esr: bool,
    filters: Json<Vec<TargetFilter>>,
    client_match_rules: Json<Vec<ClientMatchRule>>,
    modified: DateTime<Utc>,
}

impl From<TargetRow> for Target {
    fn from(row: TargetRow) -> Self {
        Target {
            id: row.id,
            name: row.name,
            on_release: row.on_release,
            on_beta: row.on_beta,
            on_aurora: row.on_aurora,
            on_nightly: row.on_nightly,
            on_esr: row.on_esr,
            filters: row.filters.0,
            client_match_rules: row.client_match_rules.0,
            modified: row.modified,
        }
    }
}

#[derive(Debug, FromRow)]
struct DistributionBundleRow {
    id: i64,
    name: String,
    code_name: String,
    enabled: bool,
    distribution_ids: Vec<i64>,
    modified: DateTime<Utc>,
}

impl From<DistributionBundleRow> for DistributionBundle {
    fn from(row: DistributionBundleRow) -> Self {
        DistributionBundle {
            id: row.id,
            name: row.name,
            code_name: row.code_name,
            enabled: row.enabled,
            distribution_ids: row.distribution_ids,
            modified: row.modified,
        }
    }
}

#[derive(Debug, FromRow)]
struct JobLogRow {
    id: i64,
    job_id: i64,
    actor: String,
    from_status: String,
    to_status: String,
    reason: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobLogRow> for JobLogEntry {
    type Error = RepositoryError;

    fn try_from(row: JobLogRow) -> Result<Self, Self::Error> {
        Ok(JobLogEntry {
            id: row.id,
            job_id: row.job_id,
            actor: row.actor,
            from_status: parse_status(&row.from_status)?,
            to_status: parse_status(&row.to_status)?,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

fn parse_status(raw: &str) -> RepositoryResult<JobStatus> {
    raw.parse()
        .map_err(|_| RepositoryError::invalid_data("jobs.status", raw))
}

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;
        info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> RepositoryResult<bool> {
        let healthy: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(healthy == 1)
    }
}

#[async_trait]
impl SnippetRepository for PgRepository {
    async fn load_catalog(&self) -> RepositoryResult<Catalog> {
        let jobs = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Job::try_from)
        .collect::<RepositoryResult<Vec<_>>>()?;

        let snippets = sqlx::query_as::<_, SnippetRow>(
            "SELECT id, name, locale_code, template, modified FROM snippets",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Snippet::from)
        .collect();

        let targets = sqlx::query_as::<_, TargetRow>(
            "SELECT id, name, on_release, on_beta, on_aurora, on_nightly, on_esr, \
                    filters, client_match_rules, modified \
             FROM targets",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Target::from)
        .collect();

        let distributions = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM distributions")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|(id, name)| Distribution { id, name })
            .collect();

        let distribution_bundles = sqlx::query_as::<_, DistributionBundleRow>(
            "SELECT b.id, b.name, b.code_name, b.enabled, b.modified, \
                    COALESCE(ARRAY_AGG(m.distribution_id ORDER BY m.distribution_id) \
                             FILTER (WHERE m.distribution_id IS NOT NULL), '{}') AS distribution_ids \
             FROM distribution_bundles b \
             LEFT JOIN distribution_bundle_distributions m ON m.distribution_bundle_id = b.id \
             GROUP BY b.id \
             ORDER BY b.id",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(DistributionBundle::from)
        .collect();

        Ok(Catalog::assemble(CatalogParts {
            jobs,
            snippets,
            targets,
            distributions,
            distribution_bundles,
        }))
    }

    async fn begin_lifecycle(&self) -> RepositoryResult<Box<dyn LifecycleTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLifecycle { tx }))
    }

    async fn record_metrics(&self, job_id: i64, update: MetricsUpdate) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE jobs SET metric_impressions = $2, metric_clicks = $3, metric_blocks = $4, \
                             metric_last_update = $5 \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(update.impressions)
        .bind(update.clicks)
        .bind(update.blocks)
        .bind(update.observed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::JobNotFound { job_id });
        }
        Ok(())
    }

    async fn job_logs(&self, job_id: i64) -> RepositoryResult<Vec<JobLogEntry>> {
        sqlx::query_as::<_, JobLogRow>(
            "SELECT id, job_id, actor, from_status, to_status, reason, created_at \
             FROM job_logs WHERE job_id = $1 ORDER BY created_at, id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(JobLogEntry::try_from)
        .collect()
    }
}

struct PgLifecycle {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LifecycleTransaction for PgLifecycle {
    async fn jobs_with_status(&mut self, status: JobStatus) -> RepositoryResult<Vec<Job>> {
        sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = $1 ORDER BY id FOR UPDATE"
        ))
        .bind(status.as_str())
        .fetch_all(&mut *self.tx)
        .await?
        .into_iter()
        .map(Job::try_from)
        .collect()
    }

    async fn change_status(
        &mut self,
        job_id: i64,
        change: StatusChange<'_>,
    ) -> RepositoryResult<JobStatus> {
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM jobs WHERE id = $1 FOR UPDATE")
                .bind(job_id)
                .fetch_optional(&mut *self.tx)
                .await?;
        let from = parse_status(&current.ok_or(RepositoryError::JobNotFound { job_id })?)?;
        let to = JobStateMachine::transition(from, &change.event)?;

        sqlx::query("UPDATE jobs SET status = $2, modified = $3 WHERE id = $1")
            .bind(job_id)
            .bind(to.as_str())
            .bind(change.at)
            .execute(&mut *self.tx)
            .await?;

        sqlx::query(
            "INSERT INTO job_logs (job_id, actor, from_status, to_status, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(job_id)
        .bind(change.actor)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(change.reason)
        .bind(change.at)
        .execute(&mut *self.tx)
        .await?;

        debug!(job_id = job_id, from = %from, to = %to, "Staged job status change");
        Ok(to)
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
