//! # System Bootstrap
//!
//! Wires configuration into the storage backend, repository, generator,
//! freshness tracker and bundle service shared by the binaries.

use std::sync::Arc;
use tracing::info;

use crate::bundles::{BundleGenerator, GeneratorSettings};
use crate::cache::{FreshnessTracker, InMemoryFreshnessCache};
use crate::config::{SnippetsConfig, StorageBackend};
use crate::database::{PgRepository, SnippetRepository};
use crate::error::Result;
use crate::lifecycle::{JobReconciler, ReconcilerSettings};
use crate::services::{BundleService, ServiceSettings};
use crate::storage::{BundleStorage, InMemoryStorage, LocalFileStorage};

/// Fully wired components
pub struct SnippetsSystem {
    pub config: SnippetsConfig,
    pub repository: Arc<dyn SnippetRepository>,
    pub storage: Arc<dyn BundleStorage>,
    pub generator: Arc<BundleGenerator>,
    pub service: Arc<BundleService>,
}

impl SnippetsSystem {
    /// Connect to PostgreSQL and build everything from `config`
    pub async fn bootstrap(config: SnippetsConfig) -> Result<Self> {
        let repository = Arc::new(PgRepository::connect(&config.database).await?);
        Ok(Self::with_repository(config, repository))
    }

    /// Build around an existing repository
    pub fn with_repository(config: SnippetsConfig, repository: Arc<dyn SnippetRepository>) -> Self {
        let storage = build_storage(&config);
        Self::with_parts(config, repository, storage)
    }

    pub fn with_parts(
        config: SnippetsConfig,
        repository: Arc<dyn SnippetRepository>,
        storage: Arc<dyn BundleStorage>,
    ) -> Self {
        let generator = Arc::new(BundleGenerator::new(
            storage.clone(),
            GeneratorSettings::from_config(&config),
        ));
        let freshness = FreshnessTracker::new(
            Arc::new(InMemoryFreshnessCache::new(config.cache.max_entries)),
            storage.clone(),
            config.cache.freshness_ttl(),
        );
        let service = Arc::new(BundleService::new(
            repository.clone(),
            storage.clone(),
            generator.clone(),
            freshness,
            ServiceSettings::from_config(&config),
        ));

        info!(
            storage_backend = ?config.bundles.storage_backend,
            use_pregen_bundles = config.server.use_pregen_bundles,
            "Snippets system assembled"
        );

        Self {
            config,
            repository,
            storage,
            generator,
            service,
        }
    }

    pub fn reconciler(&self) -> JobReconciler {
        JobReconciler::new(
            self.repository.clone(),
            ReconcilerSettings::from_config(&self.config),
        )
    }
}

pub fn build_storage(config: &SnippetsConfig) -> Arc<dyn BundleStorage> {
    let base_url = config.server.public_base_url().to_string();
    match config.bundles.storage_backend {
        StorageBackend::Local => Arc::new(LocalFileStorage::new(
            config.bundles.storage_root.clone(),
            base_url,
        )),
        StorageBackend::Memory => Arc::new(InMemoryStorage::new(base_url)),
    }
}

