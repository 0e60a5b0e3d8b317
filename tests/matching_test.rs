//! Client-to-job matching over an assembled catalog

mod common;

use chrono::Utc;
use common::*;
use snippets_core::matching::{match_jobs, JobMatcher};
use snippets_core::models::{Catalog, ClientField, ClientMatchRule};
use snippets_core::state_machine::JobStatus;

fn catalog() -> Catalog {
    let parts = CatalogBuilder::new(Utc::now())
        .published(1, &["release"], ",en,")
        .published(2, &["release"], ",en-gb,")
        .published(3, &["beta", "release"], ",fr,de,")
        .published(4, &["nightly"], ",en-us,")
        .build();
    Catalog::assemble(parts)
}

fn ids(records: &[&snippets_core::models::JobRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id()).collect()
}

#[test]
fn test_language_code_matches_every_territory() {
    let catalog = catalog();
    let matched = match_jobs(catalog.jobs(), &client_on("release", "en-US"));
    assert_eq!(ids(&matched), vec![1]);

    let matched = match_jobs(catalog.jobs(), &client_on("release", "en-GB"));
    assert_eq!(ids(&matched), vec![1, 2]);
}

#[test]
fn test_partner_channel_resolves_to_release() {
    let catalog = catalog();
    let matched = match_jobs(catalog.jobs(), &client_on("release-cck-partner", "de"));
    assert_eq!(ids(&matched), vec![3]);
}

#[test]
fn test_default_channel_is_served_nightly_content() {
    let catalog = catalog();
    let matched = match_jobs(catalog.jobs(), &client_on("default", "en-us"));
    assert_eq!(ids(&matched), vec![4]);
}

#[test]
fn test_territory_codes_match_only_their_territory() {
    let parts = CatalogBuilder::new(Utc::now())
        .published(1, &["release"], ",es,")
        .published(2, &["release"], ",es-es,")
        .published(3, &["release"], ",es-ar,es-cl,es-mx,")
        .build();
    let catalog = Catalog::assemble(parts);

    let matched = match_jobs(catalog.jobs(), &client_on("release", "es-MX"));
    assert_eq!(ids(&matched), vec![1, 3]);
}

#[test]
fn test_unknown_locale_matches_nothing() {
    let catalog = catalog();
    assert!(match_jobs(catalog.jobs(), &client_on("release", "ja")).is_empty());
}

#[test]
fn test_matcher_skips_unpublished_jobs() {
    let now = Utc::now();
    let parts = CatalogBuilder::new(now)
        .published(1, &["release"], ",en,")
        .published(2, &["release"], ",en,")
        .edit_job(2, |job| job.status = JobStatus::Scheduled)
        .build();
    let catalog = Catalog::assemble(parts);

    let matched = JobMatcher::new().match_client(catalog.jobs(), &client());
    assert_eq!(ids(&matched), vec![1]);

    let matched = JobMatcher::new()
        .include_unpublished(true)
        .match_client(catalog.jobs(), &client());
    assert_eq!(ids(&matched), vec![1, 2]);
}

#[test]
fn test_client_match_rules_gate_when_enabled() {
    let now = Utc::now();
    let mut parts = CatalogBuilder::new(now)
        .published(1, &["release"], ",en,")
        .published(2, &["release"], ",en,")
        .build();
    let exclude_linux = ClientMatchRule::new(1, "No Linux")
        .with_field(ClientField::BuildTarget, "/Linux.*/")
        .exclusion(true);
    parts
        .targets
        .iter_mut()
        .find(|t| t.id == 2)
        .unwrap()
        .client_match_rules
        .push(exclude_linux);
    let catalog = Catalog::assemble(parts);

    let without_rules = JobMatcher::new().match_client(catalog.jobs(), &client());
    assert_eq!(ids(&without_rules), vec![1, 2]);

    let with_rules = JobMatcher::new()
        .with_client_match_rules(true)
        .match_client(catalog.jobs(), &client());
    assert_eq!(ids(&with_rules), vec![1]);

    let mut windows = client();
    windows.build_target = "WINNT_x86-msvc".into();
    let with_rules = JobMatcher::new()
        .with_client_match_rules(true)
        .match_client(catalog.jobs(), &windows);
    assert_eq!(ids(&with_rules), vec![1, 2]);
}
