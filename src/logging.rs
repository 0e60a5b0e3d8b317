//! # Structured Logging Module
//!
//! Environment-aware structured logging for the front door, the bundle
//! generator and the lifecycle reconciler.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` wins when set. `SNIPPETS_LOG_FORMAT=json` switches the console
/// layer to JSON lines for log shipping.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = std::env::var("SNIPPETS_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(filter)
                .boxed()
        };

        // A subscriber may already be installed by an embedding process or a test harness.
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Current environment name (`SNIPPETS_ENV`, falling back to `APP_ENV`).
pub fn get_environment() -> String {
    std::env::var("SNIPPETS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log a job status change.
pub fn log_job_transition(job_id: i64, from: &str, to: &str, actor: &str, reason: &str) {
    tracing::info!(
        job_id = job_id,
        from_status = %from,
        to_status = %to,
        actor = %actor,
        reason = %reason,
        timestamp = %Utc::now().to_rfc3339(),
        "JOB_TRANSITION"
    );
}

/// Log a bundle write, delete or skip.
pub fn log_bundle_operation(operation: &str, path: &str, jobs: Option<usize>, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        path = %path,
        jobs = jobs,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "BUNDLE_OPERATION"
    );
}

/// Log an error with its component and operation.
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
