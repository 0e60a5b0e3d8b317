#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Snippets Core
//!
//! Backend engine for the short promotional messages shown on the browser's
//! new-tab page.
//!
//! ## Overview
//!
//! Content is authored as snippets, scheduled as jobs under a target, and
//! shipped to clients as precomputed JSON bundles. This crate decides which
//! jobs a client should see, moves jobs through their lifecycle, renders and
//! stores bundles, and answers the client-facing redirect.
//!
//! ## Module Organization
//!
//! - [`matching`] - Client match rules, channel and locale resolution, job matching
//! - [`state_machine`] - Job status transitions
//! - [`lifecycle`] - Periodic reconciliation of job status
//! - [`rendering`] - Content templates and job payload rendering
//! - [`bundles`] - Bundle generation, compression, storage paths
//! - [`cache`] - Bundle fingerprints and freshness tracking
//! - [`storage`] - Object storage backends
//! - [`database`] - Repository trait with PostgreSQL and in-memory implementations
//! - [`services`] - Bundle resolution for the front door
//! - [`web`] - axum router for the redirect endpoint
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snippets_core::bootstrap::SnippetsSystem;
//! use snippets_core::config::SnippetsConfig;
//! use snippets_core::database::InMemoryRepository;
//! use snippets_core::models::Client;
//!
//! # async fn example(client: Client) -> snippets_core::Result<()> {
//! let system = SnippetsSystem::with_repository(
//!     SnippetsConfig::default(),
//!     Arc::new(InMemoryRepository::new()),
//! );
//! let resolved = system.service.resolve(&client).await?;
//! println!("{resolved:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests; PostgreSQL tests are #[ignore]d
//! ```

pub mod bootstrap;
pub mod bundles;
pub mod cache;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod matching;
pub mod models;
pub mod rendering;
pub mod services;
pub mod state_machine;
pub mod storage;
pub mod web;

pub use bootstrap::SnippetsSystem;
pub use bundles::{BundleGenerator, BundleTriple, GenerationReport, GenerationScope, OutputMode};
pub use cache::FreshnessTracker;
pub use config::{ConfigManager, SnippetsConfig};
pub use database::{InMemoryRepository, PgRepository, SnippetRepository};
pub use error::{Result, SnippetsError};
pub use lifecycle::{JobReconciler, ReconcileCounts};
pub use matching::JobMatcher;
pub use models::{Client, ClientMatchRule, Job, Target};
pub use services::{BundleService, ResolvedBundle};
pub use state_machine::{JobEvent, JobStatus};
