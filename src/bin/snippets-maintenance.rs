//! # Snippets Maintenance
//!
//! Scheduled jobs run from cron or by hand:
//!
//! - `update-jobs` applies the job lifecycle rules once
//! - `generate-bundles` rebuilds pregenerated bundles, optionally only those
//!   touched since a timestamp

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use snippets_core::bootstrap::SnippetsSystem;
use snippets_core::bundles::{BundleTriple, GenerationReport, GenerationScope, OutputMode};
use snippets_core::config::ConfigManager;
use snippets_core::logging;

#[derive(Parser)]
#[command(name = "snippets-maintenance")]
#[command(about = "Job lifecycle and bundle generation tasks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment overlay to load (defaults to SNIPPETS_ENV)
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish, complete and cancel jobs according to their schedule and metrics
    UpdateJobs,

    /// Generate pregenerated bundles
    GenerateBundles {
        /// Only regenerate bundles affected by changes at or after this RFC 3339 time
        #[arg(long, conflicts_with_all = ["channel", "locale", "distribution_bundle"])]
        timestamp: Option<String>,

        /// Channel of a single bundle to regenerate
        #[arg(long, requires_all = ["locale", "distribution_bundle"])]
        channel: Option<String>,

        /// Locale of a single bundle to regenerate
        #[arg(long, requires_all = ["channel", "distribution_bundle"])]
        locale: Option<String>,

        /// Distribution bundle code of a single bundle to regenerate
        #[arg(long, requires_all = ["channel", "locale"])]
        distribution_bundle: Option<String>,

        /// Render without writing or deleting anything in storage
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_structured_logging();

    if let Err(e) = run(cli).await {
        error!("Maintenance task failed: {:#}", e);
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_manager = match cli.environment.as_deref() {
        Some(environment) => ConfigManager::load_from_directory_with_env(cli.config_dir, environment),
        None => ConfigManager::load_from_directory(cli.config_dir),
    }
    .context("Failed to load configuration")?;

    info!(
        environment = config_manager.environment(),
        config_directory = %config_manager.config_directory().display(),
        "Running maintenance task"
    );

    let system = SnippetsSystem::bootstrap(config_manager.config().clone())
        .await
        .context("Failed to bootstrap snippets system")?;

    match cli.command {
        Commands::UpdateJobs => {
            let counts = system
                .reconciler()
                .reconcile(Utc::now())
                .await
                .context("Job reconciliation failed")?;
            println!("{counts}");
        }
        Commands::GenerateBundles {
            timestamp,
            channel,
            locale,
            distribution_bundle,
            dry_run,
        } => {
            let scope = parse_scope(timestamp, channel, locale, distribution_bundle)?;
            let mode = if dry_run {
                OutputMode::InMemory
            } else {
                OutputMode::Persist
            };
            let report = system
                .service
                .regenerate(scope, mode)
                .await
                .context("Bundle generation failed")?;
            print_report(&report);
            if !report.is_success() {
                bail!("{} bundle(s) failed to generate", report.failed.len());
            }
        }
    }

    Ok(())
}

fn parse_scope(
    timestamp: Option<String>,
    channel: Option<String>,
    locale: Option<String>,
    distribution_bundle: Option<String>,
) -> anyhow::Result<GenerationScope> {
    if let Some(raw) = timestamp {
        let since = DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("Invalid --timestamp '{raw}'"))?
            .with_timezone(&Utc);
        return Ok(GenerationScope::ModifiedSince(since));
    }

    match (channel, locale, distribution_bundle) {
        (Some(channel), Some(locale), Some(distribution_bundle)) => Ok(GenerationScope::Single(
            BundleTriple::new(&channel, &locale, &distribution_bundle),
        )),
        (None, None, None) => Ok(GenerationScope::All),
        _ => bail!("--channel, --locale and --distribution-bundle must be given together"),
    }
}

fn print_report(report: &GenerationReport) {
    for triple in &report.written {
        println!("written  {triple}");
    }
    for triple in &report.deleted {
        println!("deleted  {triple}");
    }
    for (triple, encoded) in &report.artifacts {
        println!("rendered {triple} ({} bytes)", encoded.data.len());
    }
    for (triple, reason) in &report.failed {
        println!("failed   {triple}: {reason}");
    }
    println!(
        "{} processed: {} written, {} deleted, {} skipped, {} rendered, {} failed",
        report.processed(),
        report.written.len(),
        report.deleted.len(),
        report.skipped.len(),
        report.artifacts.len(),
        report.failed.len()
    );
}
