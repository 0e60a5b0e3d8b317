//! # Job Lifecycle
//!
//! The reconciler that advances jobs on time and metrics signals.

pub mod reconciler;

pub use reconciler::{JobReconciler, ReconcileCounts, ReconcilerSettings};
