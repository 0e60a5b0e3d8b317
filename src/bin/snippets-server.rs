//! # Snippets Server
//!
//! Runs the redirect front door: clients fetch
//! `/{startpage_version}/{name}/.../{distribution_version}/` and are sent to
//! the bundle that fits them.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin snippets-server
//!
//! # Run with a specific environment
//! SNIPPETS_ENV=production cargo run --bin snippets-server
//! ```

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use snippets_core::bootstrap::SnippetsSystem;
use snippets_core::config::ConfigManager;
use snippets_core::logging;
use snippets_core::web::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!("Starting Snippets Server...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "   Build Mode: {}",
        if cfg!(debug_assertions) {
            "Debug"
        } else {
            "Release"
        }
    );

    let config_manager = ConfigManager::load().context("Failed to load configuration")?;
    info!("   Environment: {}", config_manager.environment());

    let config = config_manager.config().clone();
    let bind_address = config.server.bind_address.clone();

    let system = SnippetsSystem::bootstrap(config)
        .await
        .context("Failed to bootstrap snippets system")?;
    let state = AppState::new(system.service.clone(), &system.config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    info!("Snippets Server listening on {}", bind_address);
    info!(
        "   Bundle mode: {}",
        if system.config.server.use_pregen_bundles {
            "pregenerated"
        } else {
            "on-demand"
        }
    );
    info!("   Press Ctrl+C to shutdown gracefully");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server terminated with error: {}", e);
        return Err(e.into());
    }

    info!("Snippets Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
