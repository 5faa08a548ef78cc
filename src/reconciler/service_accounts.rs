//! Service account pass
//!
//! Runs after the namespace pass, so namespace records already match the cluster.
//! Stale service account records are only removed when pruning is enabled.

use super::report::SyncRun;
use super::ReconcileOptions;
use crate::cluster::{ClusterClient, ClusterServiceAccount};
use crate::error::{StoreError, SyncError};
use crate::observability::metrics;
use crate::store::MirrorStore;
use std::collections::{HashMap, HashSet};
use tracing::debug;

const KIND: &str = "service_account";

pub(crate) async fn sync_service_accounts(
    cluster: &dyn ClusterClient,
    store: &dyn MirrorStore,
    options: &ReconcileOptions,
    run: &mut SyncRun,
) -> Result<(), SyncError> {
    // Kubernetes service accounts -> portal records
    let live = cluster.list_service_accounts().await?;

    for sa in &live {
        let namespace = match store.find_namespace_by_name(&sa.namespace).await {
            Ok(namespace) => namespace,
            // Inconsistent until the next sync picks the namespace up
            Err(StoreError::NamespaceNotFound { .. }) => {
                skip_dangling(sa, run);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let created = match store
            .get_or_create_service_account(&sa.name, &sa.uid, &namespace)
            .await
        {
            Ok((_, created)) => created,
            // Removed since the lookup above; same outcome as never having existed
            Err(StoreError::NamespaceNotFound { .. }) => {
                skip_dangling(sa, run);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if created {
            run.stats.service_accounts_created += 1;
            metrics::increment_records_created(KIND);
            run.info(format!(
                "Creating portal record for Kubernetes service account '{}:{}'",
                sa.namespace, sa.name
            ));
        } else {
            run.stats.service_accounts_found += 1;
            run.info(format!(
                "Found existing portal record for Kubernetes service account '{}:{}'",
                sa.namespace, sa.name
            ));
        }
    }

    if options.prune_service_accounts {
        prune_stale_service_accounts(&live, store, run).await?;
    }

    Ok(())
}

fn skip_dangling(sa: &ClusterServiceAccount, run: &mut SyncRun) {
    let skipped = SyncError::DanglingServiceAccountNamespace {
        namespace: sa.namespace.clone(),
        name: sa.name.clone(),
    };
    run.error(skipped.to_string());
    run.stats.service_accounts_skipped += 1;
    metrics::increment_service_accounts_skipped();
}

async fn prune_stale_service_accounts(
    live: &[ClusterServiceAccount],
    store: &dyn MirrorStore,
    run: &mut SyncRun,
) -> Result<(), SyncError> {
    let live_uids: HashSet<&str> = live.iter().map(|sa| sa.uid.as_str()).collect();
    let namespace_names: HashMap<_, _> = store
        .all_namespaces()
        .await?
        .into_iter()
        .map(|ns| (ns.id, ns.name))
        .collect();

    for record in store.all_service_accounts().await? {
        let Some(uid) = record.uid.as_deref() else {
            debug!(service_account = %record.name, "Leaving service account without uid in place");
            continue;
        };
        if live_uids.contains(uid) {
            continue;
        }

        let namespace = namespace_names
            .get(&record.namespace_id)
            .map_or("?", String::as_str);
        run.info(format!(
            "Removing stale portal record for Kubernetes service account '{}:{}'",
            namespace, record.name
        ));
        store.delete_service_account(&record).await?;
        run.stats.service_accounts_removed += 1;
        metrics::increment_records_removed(KIND);
    }

    Ok(())
}
