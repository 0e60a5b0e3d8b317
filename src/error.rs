//! # Structured Error Handling
//!
//! Crate-level error type. Each layer owns a narrower `thiserror` enum
//! (storage, repository, state machine, configuration) and converts into
//! [`SnippetsError`] at the public API boundary.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::database::RepositoryError;
use crate::state_machine::StateMachineError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum SnippetsError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("State transition error: {0}")]
    StateTransition(#[from] StateMachineError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Bundle serialization error: {0}")]
    Serialization(String),

    #[error("Bundle compression error: {0}")]
    Compression(String),
}

impl From<serde_json::Error> for SnippetsError {
    fn from(err: serde_json::Error) -> Self {
        SnippetsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnippetsError>;
