//! Bundle fingerprints.
//!
//! A fingerprint covers every input that changes what a client should
//! receive: the bundle triple (channel, locale, distribution bundle), the
//! matched job ids and whether each is shown or prefetch-only, each job's
//! and its snippet's modification time, the client's startpage version, and
//! the current Firefox major version that templates may interpolate.

use sha2::{Digest, Sha256};

use crate::bundles::{BundleTriple, JobSelection};
use crate::models::{Client, JobRecord};

const KEY_PREFIX: &str = "bundle_";

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

fn entry(record: &JobRecord, prefetch_only: bool) -> (i64, bool, i64, i64) {
    (
        record.job.id,
        prefetch_only,
        record.job.modified.timestamp_micros(),
        record.snippet.modified.timestamp_micros(),
    )
}

/// Fingerprint for the bundle a client on `triple` would receive from
/// `selection`. Job order does not matter.
pub fn bundle_fingerprint(
    triple: &BundleTriple,
    selection: &JobSelection<'_>,
    client: &Client,
    current_major_version: u32,
) -> String {
    let mut entries: Vec<(i64, bool, i64, i64)> = selection
        .shown
        .iter()
        .map(|record| entry(record, false))
        .chain(selection.prefetch_only.iter().map(|record| entry(record, true)))
        .collect();
    entries.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(format!("{triple}|"));
    for (id, prefetch_only, job_modified, snippet_modified) in entries {
        let kind = if prefetch_only { "p" } else { "s" };
        hasher.update(format!("{id}{kind}-{job_modified}-{snippet_modified};"));
    }
    hasher.update(format!(
        "|{}|{}",
        client.startpage_version, current_major_version
    ));
    format!("{:x}", hasher.finalize())
}

/// Freshness cache key for a fingerprint
pub fn cache_key(fingerprint: &str) -> String {
    format!("{KEY_PREFIX}{fingerprint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_selection_depends_on_triple_and_version() {
        let client = Client::default();
        let selection = JobSelection::default();
        let release = BundleTriple::new("release", "en-us", "default");
        let a = bundle_fingerprint(&release, &selection, &client, 132);
        assert_eq!(a.len(), 64);
        assert_eq!(a, bundle_fingerprint(&release, &selection, &client, 132));
        assert_ne!(a, bundle_fingerprint(&release, &selection, &client, 133));

        for other in [
            BundleTriple::new("nightly", "en-us", "default"),
            BundleTriple::new("release", "de", "default"),
            BundleTriple::new("release", "en-us", "acme"),
        ] {
            assert_ne!(a, bundle_fingerprint(&other, &selection, &client, 132));
        }
    }

    #[test]
    fn test_cache_key_prefix() {
        assert_eq!(cache_key("ab12"), "bundle_ab12");
    }
}
