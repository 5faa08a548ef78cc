//! # List Command
//!
//! Prints mirrored namespace or service account records.

use super::ResourceType;
use anyhow::{Context, Result};
use kubeportal_sync::store::{DatabaseMirrorStore, MirrorStore};
use std::collections::HashMap;

pub async fn list_command(database_url: &str, resource_type: ResourceType) -> Result<()> {
    let store = DatabaseMirrorStore::connect(database_url)
        .await
        .context("Failed to open mirror store")?;

    let namespaces = store
        .all_namespaces()
        .await
        .context("Failed to list namespace records")?;

    match resource_type {
        ResourceType::Namespaces => {
            if namespaces.is_empty() {
                println!("No namespace records found.");
                return Ok(());
            }

            println!("\n{:<6} {:<40} {:<38} {:<8}", "ID", "NAME", "UID", "VISIBLE");
            println!("{}", "-".repeat(95));
            for ns in namespaces {
                let uid = ns.uid.as_deref().unwrap_or("<local only>");
                let visible = if ns.visible { "Yes" } else { "No" };
                println!("{:<6} {:<40} {uid:<38} {visible:<8}", ns.id, ns.name);
            }
        }
        ResourceType::ServiceAccounts => {
            let accounts = store
                .all_service_accounts()
                .await
                .context("Failed to list service account records")?;
            if accounts.is_empty() {
                println!("No service account records found.");
                return Ok(());
            }

            let names: HashMap<_, _> = namespaces.into_iter().map(|ns| (ns.id, ns.name)).collect();
            println!("\n{:<6} {:<30} {:<40} {:<38}", "ID", "NAMESPACE", "NAME", "UID");
            println!("{}", "-".repeat(117));
            for sa in accounts {
                let namespace = names.get(&sa.namespace_id).map_or("<unknown>", String::as_str);
                let uid = sa.uid.as_deref().unwrap_or("-");
                println!("{:<6} {namespace:<30} {:<40} {uid:<38}", sa.id, sa.name);
            }
        }
    }

    Ok(())
}
