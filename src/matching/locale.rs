//! Locale code parsing and containment.
//!
//! Snippets store locales as `,en,fr,`. A client locale matches when the
//! code contains either the full lower-cased locale or its language prefix,
//! each wrapped in commas.

use tracing::warn;

/// Lower-case `[a-z0-9-]+`, not starting or ending with `-`
pub fn is_valid_locale(locale: &str) -> bool {
    !locale.is_empty()
        && !locale.starts_with('-')
        && !locale.ends_with('-')
        && locale
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Split a stored locale code into its entries, skipping malformed ones
pub fn parse_locale_code(code: &str) -> Vec<String> {
    code.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .filter(|entry| {
            let ok = is_valid_locale(entry);
            if !ok {
                warn!(locale = %entry, code = %code, "Skipping malformed locale code entry");
            }
            ok
        })
        .collect()
}

/// Language part of a locale (`es-mx` -> `es`)
pub fn language_prefix(locale: &str) -> &str {
    locale.split_once('-').map_or(locale, |(language, _)| language)
}

/// Containment test used by matching and bundle selection
pub fn locale_code_matches(code: &str, client_locale: &str) -> bool {
    let full = client_locale.trim().to_lowercase();
    if full.is_empty() {
        return false;
    }
    let code = code.to_lowercase();
    let language = language_prefix(&full);

    code.contains(&format!(",{full},")) || code.contains(&format!(",{language},"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_matches_any_territory() {
        assert!(locale_code_matches(",es,", "es-mx"));
        assert!(locale_code_matches(",en,fr,", "EN-us"));
    }

    #[test]
    fn test_territory_code_matches_only_that_territory() {
        assert!(!locale_code_matches(",es-es,", "es-mx"));
        assert!(locale_code_matches(",es-ar,es-cl,es-mx,", "es-mx"));
    }

    #[test]
    fn test_no_partial_entry_matches() {
        assert!(!locale_code_matches(",fr,", "f"));
        assert!(!locale_code_matches(",fr-ca,", "fr"));
        assert!(!locale_code_matches(",en,", ""));
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        assert_eq!(
            parse_locale_code(",en, fr ,,bad locale,-x,ja-JP-mac,"),
            vec!["en", "fr", "ja-jp-mac"]
        );
    }
}
