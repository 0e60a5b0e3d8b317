//! Deterministic storage keys for bundle artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::bundles::{DEFAULT_DISTRIBUTION, EXPERIMENT_PREFIX, EXTENSION, PRODUCT};
use crate::matching::resolve_channel;
use crate::models::Client;

/// One pre-generated bundle: logical channel, concrete locale, distribution bundle code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleTriple {
    pub channel: String,
    pub locale: String,
    pub distribution_bundle: String,
}

impl BundleTriple {
    pub fn new(channel: &str, locale: &str, distribution_bundle: &str) -> Self {
        Self {
            channel: channel.to_string(),
            locale: locale.to_lowercase(),
            distribution_bundle: distribution_bundle.to_string(),
        }
    }

    /// Triple a client request maps to
    pub fn for_client(client: &Client) -> Self {
        Self::new(
            resolve_channel(&client.channel),
            &client.locale,
            &distribution_code(&client.distribution),
        )
    }

    /// `Firefox/<channel>/<locale>/<code>.json`
    pub fn relative_path(&self) -> String {
        format!(
            "{PRODUCT}/{}/{}/{}.{EXTENSION}",
            self.channel, self.locale, self.distribution_bundle
        )
    }
}

impl fmt::Display for BundleTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.channel, self.locale, self.distribution_bundle)
    }
}

/// Distribution bundle code for a raw client distribution: the suffix of
/// `experiment-<code>` (case-insensitive), otherwise `default`
pub fn distribution_code(distribution: &str) -> String {
    let distribution = distribution.to_lowercase();
    match distribution.strip_prefix(EXPERIMENT_PREFIX) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => DEFAULT_DISTRIBUTION.to_string(),
    }
}

pub fn pregen_path(root: &str, triple: &BundleTriple) -> String {
    format!("{}/{}", root.trim_matches('/'), triple.relative_path())
}

pub fn on_demand_path(root: &str, fingerprint: &str) -> String {
    format!(
        "{}/bundle_{fingerprint}.{EXTENSION}",
        root.trim_matches('/')
    )
}
