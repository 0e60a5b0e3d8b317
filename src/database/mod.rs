//! # Data Access
//!
//! The [`SnippetRepository`] seam plus its in-memory and PostgreSQL backends.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;
pub use repository::{
    LifecycleTransaction, MetricsUpdate, RepositoryError, RepositoryResult, SnippetRepository,
    StatusChange,
};
