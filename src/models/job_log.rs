//! Audit trail of job status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state_machine::JobStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub id: i64,
    pub job_id: i64,
    pub actor: String,
    pub from_status: JobStatus,
    pub to_status: JobStatus,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
