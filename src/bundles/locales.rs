//! Concrete locales bundles are generated for.

use tracing::warn;

use crate::matching::locale::is_valid_locale;

/// Firefox shipping locales, lower-cased
const FIREFOX_LOCALES: &[&str] = &[
    "ach", "af", "an", "ar", "ast", "az", "be", "bg", "bn", "bo", "br", "brx", "bs", "ca",
    "ca-valencia", "cak", "ckb", "cs", "cy", "da", "de", "dsb", "el", "en-ca", "en-gb", "en-us",
    "eo", "es-ar", "es-cl", "es-es", "es-mx", "et", "eu", "fa", "ff", "fi", "fr", "frp", "fur",
    "fy-nl", "ga-ie", "gd", "gl", "gn", "gu-in", "he", "hi-in", "hr", "hsb", "hu", "hy-am", "hye",
    "ia", "id", "is", "it", "ja", "ja-jp-mac", "ka", "kab", "kk", "km", "kn", "ko", "lij", "lo",
    "lt", "ltg", "lv", "meh", "mk", "mr", "ms", "my", "nb-no", "ne-np", "nl", "nn-no", "oc",
    "pa-in", "pl", "pt-br", "pt-pt", "rm", "ro", "ru", "sat", "sc", "scn", "sco", "si", "sk",
    "skr", "sl", "son", "sq", "sr", "sv-se", "szl", "ta", "te", "tg", "th", "tl", "tr", "trs",
    "uk", "ur", "uz", "vi", "wo", "xh", "zh-cn", "zh-tw",
];

#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<String>,
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new(FIREFOX_LOCALES.iter().copied())
    }
}

impl LocaleRegistry {
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut locales: Vec<String> = locales
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .filter(|l| is_valid_locale(l))
            .collect();
        locales.sort();
        locales.dedup();
        Self { locales }
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Registry locales covered by a snippet locale entry: the entry itself
    /// and every `<entry>-*` territory variant. `ca` yields `ca` and
    /// `ca-valencia` but not `cak`.
    pub fn expand(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        if !is_valid_locale(&prefix) {
            warn!(prefix = %prefix, "Skipping malformed locale prefix");
            return Vec::new();
        }

        let territory = format!("{prefix}-");
        self.locales
            .iter()
            .filter(|locale| **locale == prefix || locale.starts_with(&territory))
            .cloned()
            .collect()
    }
}
