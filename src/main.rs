//! # KubePortal Sync
//!
//! Service that mirrors Kubernetes namespaces and service accounts into the
//! KubePortal database.
//!
//! ## Overview
//!
//! 1. **Loads configuration** from environment variables (`DATABASE_URL`, `KUBE_CONTEXT`, ...)
//! 2. **Starts the HTTP server** with `POST /sync`, metrics and probes
//! 3. **Optionally runs one sync at startup** when `SYNC_ON_STARTUP` is set
//!
//! Every later run is triggered externally, either through `POST /sync` or `kpctl sync`.

use anyhow::{Context, Result};
use kubeportal_sync::cluster::KubeConnector;
use kubeportal_sync::config::ControllerConfig;
use kubeportal_sync::constants::{
    DEFAULT_SERVER_POLL_INTERVAL_MS, DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
};
use kubeportal_sync::observability::{logging, metrics};
use kubeportal_sync::reconciler::Reconciler;
use kubeportal_sync::server::{start_server, ServerState};
use kubeportal_sync::store::MirrorStoreBackend;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS connection is made
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| panic!("Failed to install rustls crypto provider"));

    let config = ControllerConfig::from_env();
    logging::init_tracing(&config);

    info!("Starting KubePortal Sync");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    metrics::register_metrics().context("Failed to register metrics")?;

    let store = MirrorStoreBackend::from_database_url(config.database_url.as_deref())
        .await
        .context("Failed to open mirror store")?;
    let connector = KubeConnector::new(config.kube_context.clone(), config.cluster_request_timeout());
    let reconciler = Arc::new(Reconciler::new(
        Arc::new(connector),
        Arc::new(store),
        config.reconcile_options(),
    ));

    let server_state = Arc::new(ServerState::new(Arc::clone(&reconciler)));
    let server_state_clone = Arc::clone(&server_state);
    let port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    wait_for_server_ready(&server_state, &server_handle).await?;

    if config.sync_on_startup {
        info!("SYNC_ON_STARTUP is set, running initial synchronization");
        let report = reconciler.run_sync().await;
        if !report.is_success() {
            warn!(
                failed_phase = ?report.failed_phase,
                "Initial synchronization failed; waiting for the next trigger"
            );
        }
    }

    server_handle.await.context("HTTP server task panicked")?;
    info!("KubePortal Sync stopped");

    Ok(())
}

/// Poll until `start_server` has bound its listener
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(DEFAULT_SERVER_STARTUP_TIMEOUT_SECS);
    let poll_interval = Duration::from_millis(DEFAULT_SERVER_POLL_INTERVAL_MS);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready.load(Ordering::Relaxed) {
            info!("HTTP server is ready and accepting connections");
            break;
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}
