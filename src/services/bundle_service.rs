//! # Bundle Resolution Service
//!
//! Maps a client request to the URL of the bundle it should fetch.
//!
//! - **Pre-generated mode**: the URL of the per-triple artifact the periodic
//!   sweep maintains. No data access on the request path.
//! - **On-demand mode**: jobs are matched for this client, fingerprinted, and
//!   the fingerprint-addressed artifact is generated and persisted on a
//!   freshness miss. Errors surface to the caller; nothing stale is served.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::bundles::{
    on_demand_path, pregen_path, BundleGenerator, BundleTriple, GenerationScope, JobSelection,
    OutputMode,
};
use crate::cache::{bundle_fingerprint, cache_key, FreshnessTracker};
use crate::config::SnippetsConfig;
use crate::database::SnippetRepository;
use crate::error::Result;
use crate::logging::log_bundle_operation;
use crate::matching::JobMatcher;
use crate::models::{Catalog, Client};
use crate::storage::BundleStorage;

/// Outcome of resolving a client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBundle {
    /// Redirect the client here
    Redirect(String),
    /// Nothing qualifies; answer with an empty document
    Empty,
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub use_pregen_bundles: bool,
    pub pregen_root: String,
    pub on_demand_root: String,
    pub current_major_version: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&SnippetsConfig::default())
    }
}

impl ServiceSettings {
    pub fn from_config(config: &SnippetsConfig) -> Self {
        Self {
            use_pregen_bundles: config.server.use_pregen_bundles,
            pregen_root: config.bundles.pregen_root.clone(),
            on_demand_root: config.bundles.on_demand_root.clone(),
            current_major_version: config.firefox.current_major_version,
        }
    }
}

pub struct BundleService {
    repository: Arc<dyn SnippetRepository>,
    storage: Arc<dyn BundleStorage>,
    generator: Arc<BundleGenerator>,
    freshness: FreshnessTracker,
    matcher: JobMatcher,
    settings: ServiceSettings,
}

impl BundleService {
    pub fn new(
        repository: Arc<dyn SnippetRepository>,
        storage: Arc<dyn BundleStorage>,
        generator: Arc<BundleGenerator>,
        freshness: FreshnessTracker,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            repository,
            storage,
            generator,
            freshness,
            matcher: JobMatcher::new(),
            settings,
        }
    }

    pub fn with_matcher(mut self, matcher: JobMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn repository(&self) -> &Arc<dyn SnippetRepository> {
        &self.repository
    }

    pub fn storage(&self) -> &Arc<dyn BundleStorage> {
        &self.storage
    }

    pub async fn resolve(&self, client: &Client) -> Result<ResolvedBundle> {
        let triple = BundleTriple::for_client(client);

        if self.settings.use_pregen_bundles {
            let path = pregen_path(&self.settings.pregen_root, &triple);
            return Ok(ResolvedBundle::Redirect(self.storage.url(&path)));
        }

        let catalog = self.repository.load_catalog().await?;
        self.resolve_on_demand(&catalog, client, &triple).await
    }

    async fn resolve_on_demand(
        &self,
        catalog: &Catalog,
        client: &Client,
        triple: &BundleTriple,
    ) -> Result<ResolvedBundle> {
        let Some(bundle) = catalog
            .distribution_bundle_by_code(&triple.distribution_bundle)
            .filter(|bundle| bundle.enabled)
        else {
            debug!(triple = %triple, "No enabled distribution bundle for client");
            return Ok(ResolvedBundle::Empty);
        };

        let selection = self.generator.select_jobs(catalog, bundle, triple);
        let selection = JobSelection {
            shown: self.matcher.match_client(selection.shown, client),
            prefetch_only: selection.prefetch_only,
        };
        if selection.is_empty() {
            return Ok(ResolvedBundle::Empty);
        }

        let fingerprint = bundle_fingerprint(
            triple,
            &selection,
            client,
            self.settings.current_major_version,
        );
        let key = cache_key(&fingerprint);
        let path = on_demand_path(&self.settings.on_demand_root, &fingerprint);

        if !self.freshness.is_fresh(&key, &path).await? {
            let encoded = self.generator.render_bundle(triple, &selection, Utc::now())?;
            let content_type = encoded.content_type();
            self.storage
                .write(&path, encoded.data, content_type, encoded.content_encoding)
                .await?;
            self.freshness.mark_fresh(&key).await;
            log_bundle_operation("generate_on_demand", &path, Some(selection.len()), None);
        }

        Ok(ResolvedBundle::Redirect(self.storage.url(&path)))
    }

    /// Run a generation pass against a fresh catalog snapshot
    pub async fn regenerate(
        &self,
        scope: GenerationScope,
        mode: OutputMode,
    ) -> Result<crate::bundles::GenerationReport> {
        let catalog = self.repository.load_catalog().await?;
        self.generator.generate(&catalog, scope, mode).await
    }
}
