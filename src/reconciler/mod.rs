//! # Reconciler
//!
//! Mirrors Kubernetes namespaces and service accounts into the portal database.
//!
//! Kubernetes is the source of truth. The only exception are namespace records
//! created in the portal, which are meant to be provisioned in the cluster; that
//! path is not implemented and aborts the run. Nothing in the cluster is ever
//! deleted from here - that is left to kubectl and friends.
//!
//! ## Reconciliation Flow
//!
//! 1. Load the Kubernetes client configuration
//! 2. Namespace pass: create missing records, remove stale ones
//! 3. Service account pass: create missing records, skip those in unknown
//!    namespaces, optionally remove stale ones
//!
//! Any fatal error ends the run with one trailing log entry. Runs are
//! serialized by a lock held for the whole run.

use crate::cluster::ClusterConnector;
use crate::error::SyncError;
use crate::observability::metrics;
use crate::store::MirrorStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

mod namespaces;
mod report;
mod service_accounts;

pub use report::{LogEntry, LogLevel, SyncPhase, SyncReport, SyncStats};
use report::SyncRun;

/// Behaviour switches for a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Remove service account records whose uid the cluster no longer lists.
    /// Off by default: only namespaces are pruned unless asked.
    pub prune_service_accounts: bool,
}

/// Runs sync passes against a cluster connection and a mirror store
pub struct Reconciler {
    connector: Arc<dyn ClusterConnector>,
    store: Arc<dyn MirrorStore>,
    options: ReconcileOptions,
    run_lock: Mutex<()>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        connector: Arc<dyn ClusterConnector>,
        store: Arc<dyn MirrorStore>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            connector,
            store,
            options,
            run_lock: Mutex::new(()),
        }
    }

    pub fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Run one full synchronization and return its log.
    ///
    /// Waits for any run already in progress to finish first.
    pub async fn run_sync(&self) -> SyncReport {
        let _guard = self.run_lock.lock().await;
        let start = Instant::now();
        metrics::increment_sync_runs();

        let mut run = SyncRun::new();
        let outcome = self.run_passes(&mut run).await;
        let report = match outcome {
            Ok(()) => run.complete(),
            Err(err) => {
                metrics::increment_sync_failures(err.kind());
                run.fail(err)
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        metrics::observe_sync_duration(elapsed);
        info!(
            phase = ?report.phase,
            namespaces_created = report.stats.namespaces_created,
            namespaces_removed = report.stats.namespaces_removed,
            service_accounts_created = report.stats.service_accounts_created,
            service_accounts_removed = report.stats.service_accounts_removed,
            service_accounts_skipped = report.stats.service_accounts_skipped,
            duration_secs = elapsed,
            "sync.run.finished"
        );
        report
    }

    async fn run_passes(&self, run: &mut SyncRun) -> Result<(), SyncError> {
        run.enter(SyncPhase::Running);
        run.info("Starting synchronization ...");
        run.info("Loading Kubernetes client configuration ...");
        // Handle is dropped at the end of the run
        let cluster = self.connector.connect().await?;

        run.enter(SyncPhase::NamespacePass);
        run.info("Checking namespaces ...");
        namespaces::sync_namespaces(cluster.as_ref(), self.store.as_ref(), run).await?;

        run.enter(SyncPhase::ServiceAccountPass);
        run.info("Checking service accounts ...");
        service_accounts::sync_service_accounts(
            cluster.as_ref(),
            self.store.as_ref(),
            &self.options,
            run,
        )
        .await?;

        Ok(())
    }
}
