//! # Data Model
//!
//! Plain data records for clients, rules, targets, snippets, jobs and
//! distributions, plus the materialized [`Catalog`] the engines run on.

pub mod catalog;
pub mod client;
pub mod client_match_rule;
pub mod distribution;
pub mod job;
pub mod job_log;
pub mod snippet;
pub mod target;

pub use catalog::{Catalog, CatalogParts, JobRecord, JobScope};
pub use client::{Client, ClientField};
pub use client_match_rule::{ClientMatchRule, RuleField};
pub use distribution::{Distribution, DistributionBundle};
pub use job::{ClientLimits, Job, JobLimits, JobMetrics, Metric};
pub use job_log::JobLogEntry;
pub use snippet::Snippet;
pub use target::{Range, Target, TargetFilter};
