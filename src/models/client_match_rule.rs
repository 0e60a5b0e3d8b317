//! Legacy declarative client predicates.
//!
//! Each targetable field holds either nothing, a literal, or a `/regex/`.
//! The sigil is decoded once when the rule is built so matching never
//! recompiles patterns.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::client::{Client, ClientField};

/// One field of a [`ClientMatchRule`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleField {
    /// Ignored during matching
    #[default]
    Blank,
    /// Exact string equality
    Literal(String),
    /// Anchored at the start of the client value; `source` keeps the `/.../` form
    Pattern { source: String, regex: Regex },
    /// A `/.../` value whose interior failed to compile; never matches
    Invalid { source: String },
}

impl RuleField {
    /// Decode a stored field value
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Blank;
        }

        if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
            let interior = &raw[1..raw.len() - 1];
            return match Regex::new(&format!("^(?:{interior})")) {
                Ok(regex) => Self::Pattern {
                    source: raw.to_string(),
                    regex,
                },
                Err(err) => {
                    tracing::warn!(pattern = %raw, error = %err, "Invalid client match rule pattern");
                    Self::Invalid {
                        source: raw.to_string(),
                    }
                }
            };
        }

        Self::Literal(raw.to_string())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }

    /// Test a single client value. Blank fields accept anything.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Blank => true,
            Self::Literal(expected) => expected == value,
            Self::Pattern { regex, .. } => regex.is_match(value),
            Self::Invalid { .. } => false,
        }
    }

    /// The stored representation
    pub fn source(&self) -> &str {
        match self {
            Self::Blank => "",
            Self::Literal(value) => value,
            Self::Pattern { source, .. } | Self::Invalid { source } => source,
        }
    }
}

impl PartialEq for RuleField {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for RuleField {}

impl From<String> for RuleField {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for RuleField {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<RuleField> for String {
    fn from(field: RuleField) -> Self {
        field.source().to_string()
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Legacy rule referenced by Targets. Never mutated by matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMatchRule {
    pub id: i64,
    pub description: String,
    pub is_exclusion: bool,
    #[serde(default)]
    pub startpage_version: RuleField,
    #[serde(default)]
    pub name: RuleField,
    #[serde(default)]
    pub version: RuleField,
    #[serde(default)]
    pub appbuildid: RuleField,
    #[serde(default)]
    pub build_target: RuleField,
    #[serde(default)]
    pub locale: RuleField,
    #[serde(default)]
    pub channel: RuleField,
    #[serde(default)]
    pub os_version: RuleField,
    #[serde(default)]
    pub distribution: RuleField,
    #[serde(default)]
    pub distribution_version: RuleField,
}

impl ClientMatchRule {
    /// Rule with every field blank
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for one field
    pub fn with_field(mut self, field: ClientField, value: &str) -> Self {
        *self.field_mut(field) = RuleField::parse(value);
        self
    }

    pub fn exclusion(mut self, is_exclusion: bool) -> Self {
        self.is_exclusion = is_exclusion;
        self
    }

    pub fn field(&self, field: ClientField) -> &RuleField {
        match field {
            ClientField::StartpageVersion => &self.startpage_version,
            ClientField::Name => &self.name,
            ClientField::Version => &self.version,
            ClientField::Appbuildid => &self.appbuildid,
            ClientField::BuildTarget => &self.build_target,
            ClientField::Locale => &self.locale,
            ClientField::Channel => &self.channel,
            ClientField::OsVersion => &self.os_version,
            ClientField::Distribution => &self.distribution,
            ClientField::DistributionVersion => &self.distribution_version,
        }
    }

    fn field_mut(&mut self, field: ClientField) -> &mut RuleField {
        match field {
            ClientField::StartpageVersion => &mut self.startpage_version,
            ClientField::Name => &mut self.name,
            ClientField::Version => &mut self.version,
            ClientField::Appbuildid => &mut self.appbuildid,
            ClientField::BuildTarget => &mut self.build_target,
            ClientField::Locale => &mut self.locale,
            ClientField::Channel => &mut self.channel,
            ClientField::OsVersion => &mut self.os_version,
            ClientField::Distribution => &mut self.distribution,
            ClientField::DistributionVersion => &mut self.distribution_version,
        }
    }

    /// True when no field constrains the client
    pub fn is_identity(&self) -> bool {
        ClientField::ALL.iter().all(|f| self.field(*f).is_blank())
    }

    /// Evaluate the rule against a client.
    ///
    /// The first non-blank field that rejects the client short-circuits to a
    /// non-match; the result is then inverted for exclusion rules.
    pub fn matches(&self, client: &Client) -> bool {
        let matched = ClientField::ALL
            .iter()
            .all(|field| self.field(*field).accepts(client.field(*field)));

        if self.is_exclusion {
            !matched
        } else {
            matched
        }
    }
}
