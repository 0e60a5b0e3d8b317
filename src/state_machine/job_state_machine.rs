use super::errors::{StateMachineError, StateMachineResult};
use super::events::JobEvent;
use super::states::JobStatus;

/// Pure transition table for job statuses.
///
/// Persistence lives in the repository; this type only answers "where does
/// `event` take a job that is currently in `status`".
pub struct JobStateMachine;

impl JobStateMachine {
    /// Determine the target status or reject the transition
    pub fn transition(status: JobStatus, event: &JobEvent) -> StateMachineResult<JobStatus> {
        let target = match (status, event) {
            (JobStatus::Draft, JobEvent::Schedule) => JobStatus::Scheduled,
            (JobStatus::Scheduled, JobEvent::Unschedule) => JobStatus::Draft,
            (JobStatus::Scheduled, JobEvent::Publish) => JobStatus::Published,
            (JobStatus::Published, JobEvent::Complete(_)) => JobStatus::Completed,
            (JobStatus::Draft | JobStatus::Scheduled | JobStatus::Published, JobEvent::Cancel) => {
                JobStatus::Canceled
            }
            (from, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from,
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }

    /// Check whether `event` is accepted in `status` without building an error
    pub fn can_transition(status: JobStatus, event: &JobEvent) -> bool {
        Self::transition(status, event).is_ok()
    }
}
