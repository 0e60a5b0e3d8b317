//! Catalog fixtures: one default distribution bundle, builders for the rest

use chrono::{DateTime, Duration, Utc};
use snippets_core::models::{
    CatalogParts, Client, Distribution, DistributionBundle, Job, Snippet, Target,
};
use snippets_core::rendering::{ContentTemplate, SimpleTemplate};
use snippets_core::state_machine::JobStatus;

pub const DEFAULT_DISTRIBUTION_ID: i64 = 1;
pub const DEFAULT_BUNDLE_ID: i64 = 1;

/// A release en-US client on the default distribution
pub fn client() -> Client {
    Client {
        startpage_version: "6".into(),
        name: "Firefox".into(),
        version: "132.0".into(),
        appbuildid: "20241016000000".into(),
        build_target: "Linux_x86_64-gcc3".into(),
        locale: "en-US".into(),
        channel: "release".into(),
        os_version: "default".into(),
        distribution: "default".into(),
        distribution_version: "default".into(),
    }
}

pub fn client_on(channel: &str, locale: &str) -> Client {
    Client {
        channel: channel.into(),
        locale: locale.into(),
        ..client()
    }
}

pub fn snippet(id: i64, locale_code: &str, modified: DateTime<Utc>) -> Snippet {
    Snippet {
        id,
        name: format!("snippet-{id}"),
        locale_code: locale_code.into(),
        template: ContentTemplate::Simple(SimpleTemplate {
            title: format!("Title {id}"),
            text: "Hello from the new tab page".into(),
            ..Default::default()
        }),
        modified,
    }
}

pub fn target_on(id: i64, channels: &[&str], modified: DateTime<Utc>) -> Target {
    let mut target = Target::new(id, format!("target-{id}"), modified);
    for channel in channels {
        target.set_channel(channel, true);
    }
    target
}

pub fn published_job(id: i64, snippet_id: i64, target_id: i64, now: DateTime<Utc>) -> Job {
    let mut job = Job::new(id, snippet_id, target_id, DEFAULT_DISTRIBUTION_ID, now);
    job.status = JobStatus::Published;
    job
}

pub fn job_with_status(id: i64, status: JobStatus, now: DateTime<Utc>) -> Job {
    let mut job = Job::new(id, id, id, DEFAULT_DISTRIBUTION_ID, now);
    job.status = status;
    job
}

pub fn default_distribution() -> Distribution {
    Distribution {
        id: DEFAULT_DISTRIBUTION_ID,
        name: "Default".into(),
    }
}

pub fn distribution_bundle(
    id: i64,
    code_name: &str,
    distribution_ids: Vec<i64>,
    modified: DateTime<Utc>,
) -> DistributionBundle {
    DistributionBundle {
        id,
        name: code_name.to_string(),
        code_name: code_name.to_string(),
        enabled: true,
        distribution_ids,
        modified,
    }
}

/// Catalog rows under construction
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    now: DateTime<Utc>,
    parts: CatalogParts,
}

impl CatalogBuilder {
    /// Starts with the default distribution and its bundle, both a week old
    pub fn new(now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        Self {
            now,
            parts: CatalogParts {
                distributions: vec![default_distribution()],
                distribution_bundles: vec![distribution_bundle(
                    DEFAULT_BUNDLE_ID,
                    "default",
                    vec![DEFAULT_DISTRIBUTION_ID],
                    week_ago,
                )],
                ..Default::default()
            },
        }
    }

    /// Published job `id` with snippet and target of the same id
    pub fn published(mut self, id: i64, channels: &[&str], locale_code: &str) -> Self {
        let week_ago = self.now - Duration::days(7);
        self.parts.snippets.push(snippet(id, locale_code, week_ago));
        self.parts.targets.push(target_on(id, channels, week_ago));
        let mut job = published_job(id, id, id, week_ago);
        job.modified = week_ago;
        self.parts.jobs.push(job);
        self
    }

    pub fn job(mut self, job: Job) -> Self {
        let week_ago = self.now - Duration::days(7);
        self.parts.snippets.push(snippet(job.snippet_id, ",en,", week_ago));
        self.parts
            .targets
            .push(target_on(job.target_id, &["release"], week_ago));
        self.parts.jobs.push(job);
        self
    }

    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.parts.distributions.push(distribution);
        self
    }

    pub fn bundle(mut self, bundle: DistributionBundle) -> Self {
        self.parts.distribution_bundles.push(bundle);
        self
    }

    pub fn edit_job(mut self, id: i64, edit: impl FnOnce(&mut Job)) -> Self {
        if let Some(job) = self.parts.jobs.iter_mut().find(|j| j.id == id) {
            edit(job);
        }
        self
    }

    pub fn build(self) -> CatalogParts {
        self.parts
    }
}
