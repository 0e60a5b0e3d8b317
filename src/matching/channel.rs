//! Raw client channel to logical channel resolution.

use crate::constants::channels;

/// Map a raw channel string to one of the logical channels.
///
/// `default` (local builds) is served as nightly; anything else resolves to
/// the first logical channel it starts with, falling back to release.
pub fn resolve_channel(raw: &str) -> &'static str {
    let raw = raw.trim().to_lowercase();

    if raw == channels::DEFAULT_ALIAS {
        return channels::NIGHTLY;
    }

    channels::RESOLUTION_ORDER
        .iter()
        .copied()
        .find(|candidate| raw.starts_with(candidate))
        .unwrap_or(channels::FALLBACK)
}
