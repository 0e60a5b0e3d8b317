//! # Bundle Generator
//!
//! Renders published jobs into per-triple bundle artifacts and keeps storage
//! in sync with the catalog: triples that no longer have qualifying jobs, or
//! whose distribution bundle is disabled, have their artifact removed.
//!
//! Sweeps (`All`, `ModifiedSince`) isolate failures per triple: a failed
//! triple is logged and reported, and the sweep moves on. A `Single` triple
//! propagates its error to the caller.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use super::artifact::{Bundle, EncodedBundle};
use super::locales::LocaleRegistry;
use super::paths::{pregen_path, BundleTriple};
use crate::config::SnippetsConfig;
use crate::constants::channels;
use crate::error::Result;
use crate::logging::{log_bundle_operation, log_error};
use crate::models::{Catalog, DistributionBundle, JobRecord};
use crate::rendering::{JobRenderer, RenderContext, TemplateRenderer};
use crate::storage::BundleStorage;

/// Which triples a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationScope {
    All,
    /// Only triples reachable from jobs whose snippet, job row or containing
    /// distribution bundle changed at or after the timestamp
    ModifiedSince(DateTime<Utc>),
    Single(BundleTriple),
}

/// Where finished artifacts go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Write to storage, delete artifacts for empty triples
    Persist,
    /// Return artifacts in the report, never touch storage
    InMemory,
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub pregen_root: String,
    /// `None` disables compression
    pub brotli_quality: Option<u32>,
    pub nightly_includes_release: bool,
    pub render_context: RenderContext,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&SnippetsConfig::default())
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &SnippetsConfig) -> Self {
        Self {
            pregen_root: config.bundles.pregen_root.clone(),
            brotli_quality: config
                .bundles
                .brotli_compress
                .then_some(config.bundles.brotli_quality),
            nightly_includes_release: config.bundles.nightly_includes_release,
            render_context: RenderContext {
                current_firefox_major_version: config.firefox.current_major_version,
            },
        }
    }
}

/// Jobs chosen for one triple
#[derive(Debug, Default)]
pub struct JobSelection<'a> {
    /// Rendered with their real targeting
    pub shown: Vec<&'a JobRecord>,
    /// Rendered with targeting forced to `false`
    pub prefetch_only: Vec<&'a JobRecord>,
}

impl<'a> JobSelection<'a> {
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.prefetch_only.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shown.len() + self.prefetch_only.len()
    }
}

/// Outcome of one generation run
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<BundleTriple>,
    pub deleted: Vec<BundleTriple>,
    /// Empty triples with nothing in storage to remove
    pub skipped: Vec<BundleTriple>,
    pub failed: Vec<(BundleTriple, String)>,
    /// Filled in `OutputMode::InMemory` only
    pub artifacts: Vec<(BundleTriple, EncodedBundle)>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn processed(&self) -> usize {
        self.written.len()
            + self.deleted.len()
            + self.skipped.len()
            + self.failed.len()
            + self.artifacts.len()
    }
}

enum TripleOutcome {
    Written,
    Deleted,
    Skipped,
    Rendered(EncodedBundle),
}

pub struct BundleGenerator {
    storage: Arc<dyn BundleStorage>,
    renderer: Arc<dyn JobRenderer>,
    registry: LocaleRegistry,
    settings: GeneratorSettings,
}

impl std::fmt::Debug for BundleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleGenerator")
            .field("registry", &self.registry.locales().len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BundleGenerator {
    pub fn new(storage: Arc<dyn BundleStorage>, settings: GeneratorSettings) -> Self {
        Self {
            storage,
            renderer: Arc::new(TemplateRenderer),
            registry: LocaleRegistry::default(),
            settings,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn JobRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_registry(mut self, registry: LocaleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub async fn generate(
        &self,
        catalog: &Catalog,
        scope: GenerationScope,
        mode: OutputMode,
    ) -> Result<GenerationReport> {
        match scope {
            GenerationScope::Single(triple) => {
                let outcome =
                    match catalog.distribution_bundle_by_code(&triple.distribution_bundle) {
                        Some(bundle) => self.process_triple(catalog, bundle, &triple, mode).await?,
                        None => self.cleanup(&triple, mode).await?,
                    };
                let mut report = GenerationReport::default();
                record(&mut report, triple, outcome);
                Ok(report)
            }
            sweep => Ok(self.sweep(catalog, &sweep, mode).await),
        }
    }

    async fn sweep(
        &self,
        catalog: &Catalog,
        scope: &GenerationScope,
        mode: OutputMode,
    ) -> GenerationReport {
        let mut report = GenerationReport::default();
        let triples = self.plan(catalog, scope);
        info!(
            triples = triples.len(),
            scope = ?scope,
            "Starting bundle generation"
        );

        for (bundle, triple) in triples {
            match self.process_triple(catalog, bundle, &triple, mode).await {
                Ok(outcome) => record(&mut report, triple, outcome),
                Err(err) => {
                    log_error(
                        "bundle_generator",
                        "generate_triple",
                        &err.to_string(),
                        Some(&triple.to_string()),
                    );
                    report.failed.push((triple, err.to_string()));
                }
            }
        }

        info!(
            written = report.written.len(),
            deleted = report.deleted.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Bundle generation finished"
        );
        report
    }

    /// Every (distribution bundle, triple) pair a sweep must visit, in
    /// distribution bundle id order
    fn plan<'c>(
        &self,
        catalog: &'c Catalog,
        scope: &GenerationScope,
    ) -> Vec<(&'c DistributionBundle, BundleTriple)> {
        let candidates = match scope {
            GenerationScope::ModifiedSince(since) => catalog.scope().modified_since(*since).all(),
            _ => catalog.scope().all(),
        };

        let mut combinations: BTreeSet<(&'static str, String)> = candidates
            .iter()
            .flat_map(|record| {
                let prefixes = record.locale_prefixes();
                record
                    .channels()
                    .into_iter()
                    .flat_map(move |channel| {
                        prefixes
                            .clone()
                            .into_iter()
                            .map(move |prefix| (channel, prefix))
                    })
            })
            .collect();

        // Release jobs are prefetched on nightly, so every release triple
        // also owns its nightly sibling.
        if self.settings.nightly_includes_release {
            let nightly: Vec<_> = combinations
                .iter()
                .filter(|(channel, _)| *channel == channels::RELEASE)
                .map(|(_, prefix)| (channels::NIGHTLY, prefix.clone()))
                .collect();
            combinations.extend(nightly);
        }

        let distribution_ids: HashSet<i64> = candidates
            .iter()
            .map(|record| record.job.distribution_id)
            .collect();

        let mut seen = HashSet::new();
        let mut triples = Vec::new();
        for bundle in catalog.distribution_bundles() {
            if !bundle
                .distribution_ids
                .iter()
                .any(|id| distribution_ids.contains(id))
            {
                continue;
            }
            for (channel, prefix) in &combinations {
                for locale in self.registry.expand(prefix) {
                    let triple = BundleTriple::new(channel, &locale, &bundle.code_name);
                    if seen.insert(triple.clone()) {
                        triples.push((bundle, triple));
                    }
                }
            }
        }
        triples
    }

    /// Published jobs for a triple. On nightly, release jobs are added as
    /// prefetch-only when the policy is enabled.
    pub fn select_jobs<'c>(
        &self,
        catalog: &'c Catalog,
        bundle: &DistributionBundle,
        triple: &BundleTriple,
    ) -> JobSelection<'c> {
        let base = || {
            catalog
                .scope()
                .published()
                .in_distributions(&bundle.distribution_ids)
                .for_locale(&triple.locale)
        };

        let shown = base().on_channel(&triple.channel).all();

        let prefetch_only = if self.settings.nightly_includes_release
            && triple.channel == channels::NIGHTLY
        {
            let shown_ids: HashSet<i64> = shown.iter().map(|r| r.id()).collect();
            base()
                .on_channel(channels::RELEASE)
                .all()
                .into_iter()
                .filter(|record| !shown_ids.contains(&record.id()))
                .collect()
        } else {
            Vec::new()
        };

        JobSelection {
            shown,
            prefetch_only,
        }
    }

    /// Render and encode a bundle for a set of jobs
    pub fn render_bundle(
        &self,
        triple: &BundleTriple,
        selection: &JobSelection<'_>,
        generated_at: DateTime<Utc>,
    ) -> Result<EncodedBundle> {
        let ctx = &self.settings.render_context;
        let messages: Vec<Value> = selection
            .shown
            .iter()
            .map(|record| self.renderer.render(record, ctx, false))
            .chain(
                selection
                    .prefetch_only
                    .iter()
                    .map(|record| self.renderer.render(record, ctx, true)),
            )
            .collect();

        Bundle::new(
            messages,
            &triple.channel,
            &triple.locale,
            &triple.distribution_bundle,
            generated_at,
        )
        .encode(self.settings.brotli_quality)
    }

    async fn process_triple(
        &self,
        catalog: &Catalog,
        bundle: &DistributionBundle,
        triple: &BundleTriple,
        mode: OutputMode,
    ) -> Result<TripleOutcome> {
        if !bundle.enabled {
            debug!(triple = %triple, "Distribution bundle disabled");
            return self.cleanup(triple, mode).await;
        }

        let selection = self.select_jobs(catalog, bundle, triple);
        if selection.is_empty() {
            return self.cleanup(triple, mode).await;
        }

        let encoded = self.render_bundle(triple, &selection, Utc::now())?;
        match mode {
            OutputMode::InMemory => Ok(TripleOutcome::Rendered(encoded)),
            OutputMode::Persist => {
                let path = pregen_path(&self.settings.pregen_root, triple);
                let content_type = encoded.content_type();
                let size = encoded.data.len();
                self.storage
                    .write(&path, encoded.data, content_type, encoded.content_encoding)
                    .await?;
                let details = format!("{size} bytes");
                log_bundle_operation("write", &path, Some(selection.len()), Some(&details));
                Ok(TripleOutcome::Written)
            }
        }
    }

    async fn cleanup(&self, triple: &BundleTriple, mode: OutputMode) -> Result<TripleOutcome> {
        if mode == OutputMode::InMemory {
            return Ok(TripleOutcome::Skipped);
        }
        let path = pregen_path(&self.settings.pregen_root, triple);
        if self.storage.delete(&path).await? {
            log_bundle_operation("delete", &path, Some(0), None);
            Ok(TripleOutcome::Deleted)
        } else {
            Ok(TripleOutcome::Skipped)
        }
    }
}

fn record(report: &mut GenerationReport, triple: BundleTriple, outcome: TripleOutcome) {
    match outcome {
        TripleOutcome::Written => report.written.push(triple),
        TripleOutcome::Deleted => report.deleted.push(triple),
        TripleOutcome::Skipped => report.skipped.push(triple),
        TripleOutcome::Rendered(encoded) => report.artifacts.push((triple, encoded)),
    }
}
