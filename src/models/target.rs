//! Reusable targeting configurations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::Client;
use super::client_match_rule::ClientMatchRule;
use crate::constants::channels;

const WEEK_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Inclusive numeric bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl Range {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    fn jexl(&self, lhs: &str) -> Option<String> {
        let parts: Vec<String> = [
            self.min.map(|min| format!("{lhs} >= {min}")),
            self.max.map(|max| format!("{lhs} <= {max}")),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" && "))
        }
    }
}

/// Advanced client-side filters. Each renders one JEXL fragment evaluated by
/// the browser; the server never evaluates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "value", rename_all = "snake_case")]
pub enum TargetFilter {
    FirefoxVersion(Range),
    /// Profile age in weeks
    ProfileAgeWeeks(Range),
    IsDefaultBrowser(bool),
    UsesFirefoxSync(bool),
    SyncDevices(Range),
    BookmarksCount(Range),
    /// Developer heuristic based on devtools usage
    IsDeveloper(bool),
    /// ISO 3166 region codes
    Countries(Vec<String>),
    OperatingSystems(Vec<String>),
    /// Hours since the previous session ended
    PreviousSessionEndHours(Range),
    /// Raw expression appended as-is
    Custom(String),
}

impl TargetFilter {
    /// JEXL fragment for this filter, or `None` when it constrains nothing
    pub fn jexl(&self) -> Option<String> {
        match self {
            Self::FirefoxVersion(range) => range.jexl("firefoxVersion"),
            Self::ProfileAgeWeeks(range) => {
                range.jexl(&format!("(currentDate|date - profileAgeCreated) / {WEEK_MS}"))
            }
            Self::IsDefaultBrowser(value) => Some(format!("isDefaultBrowser == {value}")),
            Self::UsesFirefoxSync(value) => Some(format!("usesFirefoxSync == {value}")),
            Self::SyncDevices(range) => range.jexl("sync.totalDevices"),
            Self::BookmarksCount(range) => range.jexl("totalBookmarksCount"),
            Self::IsDeveloper(true) => Some("devToolsOpenedCount >= 5".to_string()),
            Self::IsDeveloper(false) => Some("devToolsOpenedCount < 5".to_string()),
            Self::Countries(codes) => quoted_list(codes).map(|list| format!("region in {list}")),
            Self::OperatingSystems(names) => {
                quoted_list(names).map(|list| format!("platformName in {list}"))
            }
            Self::PreviousSessionEndHours(range) => {
                range.jexl("(currentDate|date - previousSessionEnd) / 3600000")
            }
            Self::Custom(expr) => {
                let expr = expr.trim();
                (!expr.is_empty()).then(|| expr.to_string())
            }
        }
    }
}

fn quoted_list(values: &[String]) -> Option<String> {
    let items: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| format!("'{}'", v.replace('\'', "")))
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(format!("[{}]", items.join(", ")))
    }
}

/// Channel flags plus filters. Channel flags are independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: i64,
    pub name: String,
    pub on_release: bool,
    pub on_beta: bool,
    pub on_aurora: bool,
    pub on_nightly: bool,
    pub on_esr: bool,
    #[serde(default)]
    pub filters: Vec<TargetFilter>,
    #[serde(default)]
    pub client_match_rules: Vec<ClientMatchRule>,
    pub modified: DateTime<Utc>,
}

impl Target {
    /// Target with no channels and no filters
    pub fn new(id: i64, name: impl Into<String>, modified: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            on_release: false,
            on_beta: false,
            on_aurora: false,
            on_nightly: false,
            on_esr: false,
            filters: Vec::new(),
            client_match_rules: Vec::new(),
            modified,
        }
    }

    /// Flag for a logical channel; unknown channels are never targeted
    pub fn applies_to_channel(&self, channel: &str) -> bool {
        match channel {
            channels::RELEASE => self.on_release,
            channels::BETA => self.on_beta,
            channels::AURORA => self.on_aurora,
            channels::NIGHTLY => self.on_nightly,
            channels::ESR => self.on_esr,
            _ => false,
        }
    }

    /// Logical channels this target is on, in resolution order
    pub fn channels(&self) -> Vec<&'static str> {
        channels::RESOLUTION_ORDER
            .iter()
            .copied()
            .filter(|c| self.applies_to_channel(c))
            .collect()
    }

    pub fn set_channel(&mut self, channel: &str, enabled: bool) {
        match channel {
            channels::RELEASE => self.on_release = enabled,
            channels::BETA => self.on_beta = enabled,
            channels::AURORA => self.on_aurora = enabled,
            channels::NIGHTLY => self.on_nightly = enabled,
            channels::ESR => self.on_esr = enabled,
            _ => {}
        }
    }

    /// Client-side targeting expression: every filter fragment joined with `&&`
    pub fn jexl_expr(&self) -> String {
        self.filters
            .iter()
            .filter_map(TargetFilter::jexl)
            .collect::<Vec<_>>()
            .join(" && ")
    }

    /// Legacy rule check: every attached rule must match
    pub fn client_rules_match(&self, client: &Client) -> bool {
        self.client_match_rules.iter().all(|rule| rule.matches(client))
    }
}
