// Job lifecycle state machine.
//
// Statuses, the events that move between them, and the transition table.
// Persisting a transition (and its audit log entry) is the repository's job.

pub mod errors;
pub mod events;
pub mod job_state_machine;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::JobEvent;
pub use job_state_machine::JobStateMachine;
pub use states::JobStatus;
