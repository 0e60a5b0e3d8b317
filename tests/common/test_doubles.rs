//! Storage and repository wrappers that fail on demand

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use snippets_core::database::{
    InMemoryRepository, LifecycleTransaction, MetricsUpdate, RepositoryError, RepositoryResult,
    SnippetRepository, StatusChange,
};
use snippets_core::models::{Catalog, Job, JobLogEntry};
use snippets_core::state_machine::JobStatus;
use snippets_core::storage::{
    BundleStorage, InMemoryStorage, ObjectMetadata, StorageError, StorageResult, StoredObject,
};

/// In-memory storage whose writes fail for keys containing any of the given fragments
#[derive(Debug)]
pub struct FailingStorage {
    inner: InMemoryStorage,
    fail_on: Vec<String>,
}

impl FailingStorage {
    pub fn failing_on(fragments: &[&str]) -> Self {
        Self {
            inner: InMemoryStorage::new("https://cdn.example.com"),
            fail_on: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Every write fails
    pub fn always() -> Self {
        Self::failing_on(&[""])
    }

    pub fn inner(&self) -> &InMemoryStorage {
        &self.inner
    }

    fn should_fail(&self, path: &str) -> bool {
        self.fail_on.iter().any(|fragment| path.contains(fragment.as_str()))
    }
}

#[async_trait]
impl BundleStorage for FailingStorage {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &str) -> StorageResult<StoredObject> {
        self.inner.read(path).await
    }

    async fn write(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> StorageResult<ObjectMetadata> {
        if self.should_fail(path) {
            return Err(StorageError::Unavailable(format!("write refused for {path}")));
        }
        self.inner
            .write(path, data, content_type, content_encoding)
            .await
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        self.inner.delete(path).await
    }

    fn url(&self, path: &str) -> String {
        self.inner.url(path)
    }
}

/// Repository whose lifecycle transactions refuse to change the listed jobs
#[derive(Debug, Clone)]
pub struct FailingRepository {
    inner: InMemoryRepository,
    poisoned: Arc<HashSet<i64>>,
}

impl FailingRepository {
    pub fn new(inner: InMemoryRepository, poisoned: &[i64]) -> Self {
        Self {
            inner,
            poisoned: Arc::new(poisoned.iter().copied().collect()),
        }
    }
}

struct FailingLifecycle {
    inner: Box<dyn LifecycleTransaction>,
    poisoned: Arc<HashSet<i64>>,
}

#[async_trait]
impl LifecycleTransaction for FailingLifecycle {
    async fn jobs_with_status(&mut self, status: JobStatus) -> RepositoryResult<Vec<Job>> {
        self.inner.jobs_with_status(status).await
    }

    async fn change_status(
        &mut self,
        job_id: i64,
        change: StatusChange<'_>,
    ) -> RepositoryResult<JobStatus> {
        if self.poisoned.contains(&job_id) {
            return Err(RepositoryError::invalid_data("job_id", job_id.to_string()));
        }
        self.inner.change_status(job_id, change).await
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl SnippetRepository for FailingRepository {
    async fn load_catalog(&self) -> RepositoryResult<Catalog> {
        self.inner.load_catalog().await
    }

    async fn begin_lifecycle(&self) -> RepositoryResult<Box<dyn LifecycleTransaction>> {
        let inner = self.inner.begin_lifecycle().await?;
        Ok(Box::new(FailingLifecycle {
            inner,
            poisoned: self.poisoned.clone(),
        }))
    }

    async fn record_metrics(&self, job_id: i64, update: MetricsUpdate) -> RepositoryResult<()> {
        self.inner.record_metrics(job_id, update).await
    }

    async fn job_logs(&self, job_id: i64) -> RepositoryResult<Vec<JobLogEntry>> {
        self.inner.job_logs(job_id).await
    }
}
