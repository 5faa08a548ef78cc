//! # Sync Command
//!
//! Triggers `POST /sync` on a running server.

use anyhow::{Context, Result};
use kubeportal_sync::reconciler::SyncReport;

pub async fn sync_command(url: &str) -> Result<()> {
    let endpoint = format!("{}/sync", url.trim_end_matches('/'));
    println!("Triggering synchronization at {endpoint}...");

    let response = reqwest::Client::new()
        .post(&endpoint)
        .send()
        .await
        .with_context(|| format!("Failed to reach kubeportal-sync at {endpoint}"))?;

    let status = response.status();
    // Failed runs still come back with a report body
    let report: SyncReport = response
        .json()
        .await
        .with_context(|| format!("Unexpected response from {endpoint} (HTTP {status})"))?;

    super::print_report(&report)
}
