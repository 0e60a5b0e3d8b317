mod common;

use common::strategies::*;
use proptest::prelude::*;
use snippets_core::bundles::BundleTriple;
use snippets_core::matching::{locale_code_matches, resolve_channel};
use snippets_core::models::ClientMatchRule;

proptest! {
    /// Property: a rule with every field blank matches exactly when it is not an exclusion
    #[test]
    fn blank_rule_matches_unless_exclusion(client in client_strategy(), is_exclusion in any::<bool>()) {
        let rule = ClientMatchRule::new(1, "blank").exclusion(is_exclusion);
        prop_assert!(rule.is_identity());
        prop_assert_eq!(rule.matches(&client), !is_exclusion);
    }

    /// Property: exclusion is the exact negation of the same inclusion rule
    #[test]
    fn exclusion_negates_inclusion(
        client in client_strategy(),
        field in field_strategy(),
        value in token_strategy(),
    ) {
        let include = ClientMatchRule::new(1, "rule").with_field(field, &value);
        let exclude = include.clone().exclusion(true);
        prop_assert_ne!(include.matches(&client), exclude.matches(&client));
    }

    /// Property: a literal on a field matches exactly when the client value equals it
    #[test]
    fn literal_is_equality(
        client in client_strategy(),
        field in field_strategy(),
        value in token_strategy(),
    ) {
        let rule = ClientMatchRule::new(1, "literal").with_field(field, &value);
        prop_assert_eq!(rule.matches(&client), client.field(field) == value);
    }

    /// Property: an anchored pattern accepts every value that starts with its literal prefix
    #[test]
    fn pattern_matches_prefix(
        client in client_strategy(),
        field in field_strategy(),
    ) {
        let value = client.field(field).to_string();
        let head: String = value.chars().take(1).collect();
        let rule = ClientMatchRule::new(1, "pattern").with_field(field, &format!("/{head}/"));
        prop_assert!(rule.matches(&client));
    }

    /// Property: channel resolution always yields a logical channel
    #[test]
    fn channels_resolve_to_logical_set(raw in channel_strategy()) {
        let resolved = resolve_channel(&raw);
        prop_assert!(["nightly", "aurora", "beta", "release", "esr"].contains(&resolved));
    }

    /// Property: a language-only code matches every territory of that language
    #[test]
    fn language_code_matches_territories(locale in locale_strategy()) {
        let language = locale.split('-').next().unwrap().to_lowercase();
        let code = format!(",{language},");
        prop_assert!(locale_code_matches(&code, &locale));
    }

    /// Property: bundle triples always carry a lowercase locale
    #[test]
    fn triple_locale_is_lowercase(locale in locale_strategy(), channel in channel_strategy()) {
        let triple = BundleTriple::new(resolve_channel(&channel), &locale, "default");
        prop_assert_eq!(triple.locale, locale.to_lowercase());
    }
}
