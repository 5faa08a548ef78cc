//! # Run Command
//!
//! One synchronization in the current process, no server involved.

use anyhow::{Context, Result};
use kubeportal_sync::cluster::KubeConnector;
use kubeportal_sync::config::ControllerConfig;
use kubeportal_sync::reconciler::Reconciler;
use kubeportal_sync::store::MirrorStoreBackend;
use std::sync::Arc;

pub async fn run_command(config: &ControllerConfig) -> Result<()> {
    let store = MirrorStoreBackend::from_database_url(config.database_url.as_deref())
        .await
        .context("Failed to open mirror store")?;
    let connector = KubeConnector::new(config.kube_context.clone(), config.cluster_request_timeout());
    let reconciler = Reconciler::new(
        Arc::new(connector),
        Arc::new(store),
        config.reconcile_options(),
    );

    let report = reconciler.run_sync().await;
    super::print_report(&report)
}
