//! Distribution partners and the bundle groupings they ship in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin channel partner (`Default`, an OEM, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: i64,
    pub name: String,
}

/// Distributions delivered together under one bundle file per channel and locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBundle {
    pub id: i64,
    pub name: String,
    /// File name component: `Firefox/<channel>/<locale>/<code_name>.json`
    pub code_name: String,
    pub enabled: bool,
    pub distribution_ids: Vec<i64>,
    pub modified: DateTime<Utc>,
}

impl DistributionBundle {
    pub fn contains(&self, distribution_id: i64) -> bool {
        self.distribution_ids.contains(&distribution_id)
    }
}
