use serde::{Deserialize, Serialize};
use std::fmt;

/// Job status. Only [`JobStatus::Published`] jobs are eligible for bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Being edited, never shown
    #[default]
    Draft,
    /// Waiting for `publish_start`
    Scheduled,
    /// Live; included in bundles
    Published,
    /// Ran its course (end date, limit, or metrics safety valve)
    Completed,
    /// Stopped by an editor
    Canceled,
}

impl JobStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Check if jobs in this state are delivered to clients
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Published)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_terminal_check() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Canceled.is_terminal());
        assert!(!JobStatus::Draft.is_terminal());
        assert!(!JobStatus::Scheduled.is_terminal());
        assert!(!JobStatus::Published.is_terminal());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(JobStatus::Published.to_string(), "published");
        assert_eq!("canceled".parse::<JobStatus>().unwrap(), JobStatus::Canceled);
        assert!("cancelled".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&JobStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
        let parsed: JobStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, JobStatus::Scheduled);
    }
}
