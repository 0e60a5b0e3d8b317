//! Pregenerated bundle sweeps over in-memory storage

mod common;

use chrono::{Duration, Utc};
use std::sync::Arc;

use common::*;
use snippets_core::bundles::{
    decode_bundle, BundleGenerator, BundleTriple, GenerationScope, GeneratorSettings,
    LocaleRegistry, OutputMode,
};
use snippets_core::models::{Catalog, Distribution};
use snippets_core::state_machine::JobStatus;
use snippets_core::storage::{BundleStorage, InMemoryStorage};

const RELEASE_EN_US: &str = "bundles-pregen/Firefox/release/en-us/default.json";
const RELEASE_EN_GB: &str = "bundles-pregen/Firefox/release/en-gb/default.json";

fn generator(storage: Arc<dyn BundleStorage>) -> BundleGenerator {
    BundleGenerator::new(storage, GeneratorSettings::default())
        .with_registry(LocaleRegistry::new(["en-us", "en-gb", "fr", "de"]))
}

#[tokio::test]
async fn test_single_job_lands_in_every_matching_locale() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(7, &["release"], ",en,")
            .build(),
    );
    let storage = Arc::new(InMemoryStorage::default());

    let report = generator(storage.clone())
        .generate(&catalog, GenerationScope::All, OutputMode::Persist)
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.written.len(), 2);

    let stored = storage.read(RELEASE_EN_US).await.unwrap();
    assert_eq!(stored.metadata.content_encoding.as_deref(), Some("br"));
    assert_eq!(stored.metadata.content_type, "application/json");

    let bundle = decode_bundle(&stored.data, stored.metadata.content_encoding.as_deref()).unwrap();
    assert_eq!(bundle.metadata.number_of_snippets, 1);
    assert_eq!(bundle.messages[0]["id"], "7");
    assert_eq!(bundle.messages[0]["template"], "simple_snippet");
    assert_eq!(bundle.metadata.channel, "release");
    assert_eq!(bundle.metadata.locale, "en-us");
    assert!(storage.exists(RELEASE_EN_GB).await.unwrap());
}

#[tokio::test]
async fn test_completed_job_bundle_is_deleted() {
    let now = Utc::now();
    let storage = Arc::new(InMemoryStorage::default());
    let generator = generator(storage.clone());

    let parts = CatalogBuilder::new(now)
        .published(7, &["release"], ",en-us,")
        .build();
    let catalog = Catalog::assemble(parts.clone());
    generator
        .generate(&catalog, GenerationScope::All, OutputMode::Persist)
        .await
        .unwrap();
    assert!(storage.exists(RELEASE_EN_US).await.unwrap());

    let mut parts = parts;
    parts.jobs[0].status = JobStatus::Completed;
    parts.jobs[0].modified = now;
    let catalog = Catalog::assemble(parts);

    let report = generator
        .generate(
            &catalog,
            GenerationScope::ModifiedSince(now - Duration::minutes(5)),
            OutputMode::Persist,
        )
        .await
        .unwrap();

    assert_eq!(
        report.deleted,
        vec![BundleTriple::new("release", "en-us", "default")]
    );
    assert!(!storage.exists(RELEASE_EN_US).await.unwrap());
}

#[tokio::test]
async fn test_modified_since_skips_untouched_jobs() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(1, &["release"], ",en-us,")
            .published(2, &["beta"], ",fr,")
            .edit_job(2, |j| j.modified = now)
            .build(),
    );
    let storage = Arc::new(InMemoryStorage::default());

    let report = generator(storage.clone())
        .generate(
            &catalog,
            GenerationScope::ModifiedSince(now - Duration::hours(1)),
            OutputMode::Persist,
        )
        .await
        .unwrap();

    assert_eq!(report.written, vec![BundleTriple::new("beta", "fr", "default")]);
    assert_eq!(
        storage.paths(),
        vec!["bundles-pregen/Firefox/beta/fr/default.json".to_string()]
    );
}

#[tokio::test]
async fn test_one_failing_triple_does_not_stop_the_sweep() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(1, &["release"], ",en,")
            .build(),
    );
    let storage = Arc::new(FailingStorage::failing_on(&["/en-gb/"]));

    let report = generator(storage.clone())
        .generate(&catalog, GenerationScope::All, OutputMode::Persist)
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, BundleTriple::new("release", "en-gb", "default"));
    assert_eq!(report.written, vec![BundleTriple::new("release", "en-us", "default")]);
    assert!(storage.inner().exists(RELEASE_EN_US).await.unwrap());
}

#[tokio::test]
async fn test_single_scope_propagates_storage_errors() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(1, &["release"], ",en,")
            .build(),
    );
    let storage = Arc::new(FailingStorage::always());

    let result = generator(storage)
        .generate(
            &catalog,
            GenerationScope::Single(BundleTriple::new("release", "en-us", "default")),
            OutputMode::Persist,
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_in_memory_mode_never_touches_storage() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(1, &["release"], ",en-us,")
            .build(),
    );
    let storage = Arc::new(InMemoryStorage::default());

    let report = generator(storage.clone())
        .generate(&catalog, GenerationScope::All, OutputMode::InMemory)
        .await
        .unwrap();

    assert!(storage.is_empty());
    assert_eq!(report.artifacts.len(), 1);
    let (triple, encoded) = &report.artifacts[0];
    assert_eq!(triple.to_string(), "release/en-us/default");
    assert_eq!(encoded.decode().unwrap().metadata.number_of_snippets, 1);
}

#[tokio::test]
async fn test_jobs_are_split_by_distribution_bundle() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(1, &["release"], ",en-us,")
            .published(2, &["release"], ",en-us,")
            .edit_job(2, |j| j.distribution_id = 2)
            .distribution(Distribution {
                id: 2,
                name: "Acme".into(),
            })
            .bundle(distribution_bundle(2, "acme", vec![2], now))
            .build(),
    );
    let storage = Arc::new(InMemoryStorage::default());

    generator(storage.clone())
        .generate(&catalog, GenerationScope::All, OutputMode::Persist)
        .await
        .unwrap();

    let default = storage.read(RELEASE_EN_US).await.unwrap();
    let default = decode_bundle(&default.data, default.metadata.content_encoding.as_deref()).unwrap();
    assert_eq!(default.messages.len(), 1);
    assert_eq!(default.messages[0]["id"], "1");

    let acme = storage
        .read("bundles-pregen/Firefox/release/en-us/acme.json")
        .await
        .unwrap();
    let acme = decode_bundle(&acme.data, acme.metadata.content_encoding.as_deref()).unwrap();
    assert_eq!(acme.messages.len(), 1);
    assert_eq!(acme.messages[0]["id"], "2");
}

#[tokio::test]
async fn test_nightly_carries_release_jobs_as_prefetch_only() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(1, &["nightly"], ",en-us,")
            .published(2, &["release"], ",en-us,")
            .build(),
    );
    let storage = Arc::new(InMemoryStorage::default());
    let mut settings = GeneratorSettings::default();
    settings.nightly_includes_release = true;
    let generator = BundleGenerator::new(storage.clone(), settings)
        .with_registry(LocaleRegistry::new(["en-us"]));

    generator
        .generate(&catalog, GenerationScope::All, OutputMode::Persist)
        .await
        .unwrap();

    let nightly = storage
        .read("bundles-pregen/Firefox/nightly/en-us/default.json")
        .await
        .unwrap();
    let nightly = decode_bundle(&nightly.data, nightly.metadata.content_encoding.as_deref()).unwrap();
    assert_eq!(nightly.messages.len(), 2);
    assert_eq!(nightly.messages[1]["id"], "2");
    assert_eq!(nightly.messages[1]["targeting"], "false");
}

fn prefetching_generator(storage: Arc<dyn BundleStorage>) -> BundleGenerator {
    let mut settings = GeneratorSettings::default();
    settings.nightly_includes_release = true;
    BundleGenerator::new(storage, settings).with_registry(LocaleRegistry::new(["en-us"]))
}

const NIGHTLY_EN_US: &str = "bundles-pregen/Firefox/nightly/en-us/default.json";

#[tokio::test]
async fn test_release_only_catalog_still_writes_nightly_prefetch() {
    let now = Utc::now();
    let catalog = Catalog::assemble(
        CatalogBuilder::new(now)
            .published(2, &["release"], ",en-us,")
            .build(),
    );
    let storage = Arc::new(InMemoryStorage::default());

    let report = prefetching_generator(storage.clone())
        .generate(&catalog, GenerationScope::All, OutputMode::Persist)
        .await
        .unwrap();

    assert!(report
        .written
        .contains(&BundleTriple::new("nightly", "en-us", "default")));
    let nightly = storage.read(NIGHTLY_EN_US).await.unwrap();
    let nightly = decode_bundle(&nightly.data, nightly.metadata.content_encoding.as_deref()).unwrap();
    assert_eq!(nightly.metadata.channel, "nightly");
    assert_eq!(nightly.messages.len(), 1);
    assert_eq!(nightly.messages[0]["id"], "2");
    assert_eq!(nightly.messages[0]["targeting"], "false");
}

#[tokio::test]
async fn test_completed_release_job_clears_nightly_prefetch_copy() {
    let now = Utc::now();
    let storage = Arc::new(InMemoryStorage::default());
    let generator = prefetching_generator(storage.clone());

    let parts = CatalogBuilder::new(now)
        .published(2, &["release"], ",en-us,")
        .build();
    generator
        .generate(
            &Catalog::assemble(parts.clone()),
            GenerationScope::All,
            OutputMode::Persist,
        )
        .await
        .unwrap();
    assert!(storage.exists(NIGHTLY_EN_US).await.unwrap());

    let mut parts = parts;
    parts.jobs[0].status = JobStatus::Completed;
    parts.jobs[0].modified = now;
    let report = generator
        .generate(
            &Catalog::assemble(parts),
            GenerationScope::ModifiedSince(now - Duration::minutes(5)),
            OutputMode::Persist,
        )
        .await
        .unwrap();

    assert!(report
        .deleted
        .contains(&BundleTriple::new("nightly", "en-us", "default")));
    assert!(!storage.exists(NIGHTLY_EN_US).await.unwrap());
    assert!(!storage.exists(RELEASE_EN_US).await.unwrap());
}
