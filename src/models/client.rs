//! Client signature extracted from an incoming bundle request.

use serde::{Deserialize, Serialize};

/// Fields of a [`Client`] that rules can target, in URL path order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientField {
    StartpageVersion,
    Name,
    Version,
    Appbuildid,
    BuildTarget,
    Locale,
    Channel,
    OsVersion,
    Distribution,
    DistributionVersion,
}

impl ClientField {
    pub const ALL: [ClientField; 10] = [
        ClientField::StartpageVersion,
        ClientField::Name,
        ClientField::Version,
        ClientField::Appbuildid,
        ClientField::BuildTarget,
        ClientField::Locale,
        ClientField::Channel,
        ClientField::OsVersion,
        ClientField::Distribution,
        ClientField::DistributionVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartpageVersion => "startpage_version",
            Self::Name => "name",
            Self::Version => "version",
            Self::Appbuildid => "appbuildid",
            Self::BuildTarget => "build_target",
            Self::Locale => "locale",
            Self::Channel => "channel",
            Self::OsVersion => "os_version",
            Self::Distribution => "distribution",
            Self::DistributionVersion => "distribution_version",
        }
    }
}

/// One requesting browser. Pure data, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Client {
    pub startpage_version: String,
    pub name: String,
    pub version: String,
    pub appbuildid: String,
    pub build_target: String,
    pub locale: String,
    pub channel: String,
    pub os_version: String,
    pub distribution: String,
    pub distribution_version: String,
}

impl Client {
    /// Value of `field` for this client
    pub fn field(&self, field: ClientField) -> &str {
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

    /// Lower-cased locale, the form bundles are keyed by
    pub fn normalized_locale(&self) -> String {
        self.locale.to_lowercase()
    }
}
