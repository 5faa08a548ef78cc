//! Namespace pass
//!
//! Kubernetes is authoritative: every live namespace gets a portal record, and
//! every portal record whose uid is no longer live is removed.

use super::report::SyncRun;
use crate::cluster::ClusterClient;
use crate::error::SyncError;
use crate::observability::metrics;
use crate::store::MirrorStore;
use std::collections::HashSet;

const KIND: &str = "namespace";

pub(crate) async fn sync_namespaces(
    cluster: &dyn ClusterClient,
    store: &dyn MirrorStore,
    run: &mut SyncRun,
) -> Result<(), SyncError> {
    // Kubernetes namespaces -> portal records
    let live = cluster.list_namespaces().await?;
    let live_uids: HashSet<&str> = live.iter().map(|ns| ns.uid.as_str()).collect();

    for ns in &live {
        let (_, created) = store.get_or_create_namespace(&ns.name, &ns.uid).await?;
        if created {
            run.stats.namespaces_created += 1;
            metrics::increment_records_created(KIND);
            run.info(format!(
                "Creating portal record for Kubernetes namespace '{}'",
                ns.name
            ));
        } else {
            run.stats.namespaces_found += 1;
            run.info(format!(
                "Found existing portal record for Kubernetes namespace '{}'",
                ns.name
            ));
        }
    }

    // Portal records -> Kubernetes namespaces
    for record in store.all_namespaces().await? {
        match record.uid.as_deref() {
            Some(uid) if live_uids.contains(uid) => {
                run.info(format!(
                    "Found existing Kubernetes namespace '{}' for portal record",
                    record.name
                ));
            }
            Some(_) => {
                run.info(format!(
                    "Removing stale portal record for Kubernetes namespace '{}'",
                    record.name
                ));
                store.delete_namespace(&record).await?;
                run.stats.namespaces_removed += 1;
                metrics::increment_records_removed(KIND);
            }
            None => {
                run.info(format!("Creating Kubernetes namespace '{}'", record.name));
                return Err(SyncError::OrphanLocalNamespace { name: record.name });
            }
        }
    }

    Ok(())
}
