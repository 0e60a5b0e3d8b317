use thiserror::Error;

use super::states::JobStatus;

/// Errors raised when validating job status transitions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on event '{event}'")]
    InvalidTransition { from: JobStatus, event: String },

    #[error("Job {job_id} not found")]
    JobNotFound { job_id: i64 },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
