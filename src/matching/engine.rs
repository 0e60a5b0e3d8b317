//! # Job Matching Engine
//!
//! Selects the jobs a client is eligible for: the target must be on the
//! client's logical channel and the snippet locale code must contain the
//! client's locale or language. No ranking is applied; every match ships.

use tracing::debug;

use super::channel::resolve_channel;
use super::locale::locale_code_matches;
use crate::models::{Client, JobRecord};
use crate::state_machine::JobStatus;

/// Channel and locale intersection over an arbitrary job set
pub fn match_jobs<'a, I>(jobs: I, client: &Client) -> Vec<&'a JobRecord>
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let channel = resolve_channel(&client.channel);
    let locale = client.normalized_locale();

    jobs.into_iter()
        .filter(|record| record.target.applies_to_channel(channel))
        .filter(|record| locale_code_matches(&record.snippet.locale_code, &locale))
        .collect()
}

/// Configurable matcher used by the request path
#[derive(Debug, Clone)]
pub struct JobMatcher {
    published_only: bool,
    client_match_rules: bool,
}

impl Default for JobMatcher {
    fn default() -> Self {
        Self {
            published_only: true,
            client_match_rules: false,
        }
    }
}

impl JobMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep draft/scheduled/completed jobs in the candidate set
    pub fn include_unpublished(mut self, include: bool) -> Self {
        self.published_only = !include;
        self
    }

    /// Also require every legacy ClientMatchRule on the target to match
    pub fn with_client_match_rules(mut self, enabled: bool) -> Self {
        self.client_match_rules = enabled;
        self
    }

    pub fn match_client<'a, I>(&self, jobs: I, client: &Client) -> Vec<&'a JobRecord>
    where
        I: IntoIterator<Item = &'a JobRecord>,
    {
        let candidates = jobs
            .into_iter()
            .filter(|record| !self.published_only || record.job.status == JobStatus::Published);

        let mut matched = match_jobs(candidates, client);
        if self.client_match_rules {
            matched.retain(|record| record.target.client_rules_match(client));
        }

        debug!(
            channel = %client.channel,
            locale = %client.locale,
            matched = matched.len(),
            "Matched jobs for client"
        );
        matched
    }
}
