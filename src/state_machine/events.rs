use serde::{Deserialize, Serialize};

/// Events that can trigger job status transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum JobEvent {
    /// Editor queues a draft for publication
    Schedule,
    /// Editor pulls a scheduled job back to draft
    Unschedule,
    /// Publication window opened
    Publish,
    /// Job ran its course; carries the reason
    Complete(String),
    /// Editor stops the job
    Cancel,
}

impl JobEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Unschedule => "unschedule",
            Self::Publish => "publish",
            Self::Complete(_) => "complete",
            Self::Cancel => "cancel",
        }
    }

    /// Reason to record on the job log when the event does not carry one
    pub fn default_reason(&self) -> String {
        match self {
            Self::Schedule => "Job scheduled.".to_string(),
            Self::Unschedule => "Job unscheduled.".to_string(),
            Self::Publish => "Job published.".to_string(),
            Self::Complete(reason) => reason.clone(),
            Self::Cancel => "Job canceled.".to_string(),
        }
    }
}
