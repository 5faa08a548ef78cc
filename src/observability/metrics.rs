//! # Metrics
//!
//! Prometheus metrics for monitoring sync runs.
//!
//! ## Metrics Exposed
//!
//! - `kubeportal_sync_runs_total` - Total number of sync runs started
//! - `kubeportal_sync_failures_total` - Failed runs by error kind
//! - `kubeportal_sync_duration_seconds` - Duration of sync runs
//! - `kubeportal_sync_records_created_total` - Portal records created, by kind
//! - `kubeportal_sync_records_removed_total` - Stale portal records removed, by kind
//! - `kubeportal_sync_service_accounts_skipped_total` - Service accounts skipped for unknown namespaces
//! - `kubeportal_sync_cluster_request_duration_seconds` - Kubernetes API round trips, by operation
//! - `kubeportal_sync_cluster_request_errors_total` - Failed Kubernetes API round trips, by operation

use anyhow::Result;
use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static SYNC_RUNS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("kubeportal_sync_runs_total", "Total number of sync runs")
        .expect("Failed to create SYNC_RUNS_TOTAL metric - this should never happen")
});

static SYNC_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kubeportal_sync_failures_total",
            "Total number of failed sync runs by error kind",
        ),
        &["kind"],
    )
    .expect("Failed to create SYNC_FAILURES_TOTAL metric - this should never happen")
});

static SYNC_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "kubeportal_sync_duration_seconds",
            "Duration of sync runs in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create SYNC_DURATION metric - this should never happen")
});

static RECORDS_CREATED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kubeportal_sync_records_created_total",
            "Total number of portal records created by kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RECORDS_CREATED_TOTAL metric - this should never happen")
});

static RECORDS_REMOVED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kubeportal_sync_records_removed_total",
            "Total number of stale portal records removed by kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RECORDS_REMOVED_TOTAL metric - this should never happen")
});

static SERVICE_ACCOUNTS_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kubeportal_sync_service_accounts_skipped_total",
        "Total number of service accounts skipped because their namespace has no portal record",
    )
    .expect("Failed to create SERVICE_ACCOUNTS_SKIPPED_TOTAL metric - this should never happen")
});

static CLUSTER_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "kubeportal_sync_cluster_request_duration_seconds",
            "Duration of Kubernetes API requests in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 30.0]),
        &["operation"],
    )
    .expect("Failed to create CLUSTER_REQUEST_DURATION metric - this should never happen")
});

static CLUSTER_REQUEST_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kubeportal_sync_cluster_request_errors_total",
            "Total number of failed Kubernetes API requests by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create CLUSTER_REQUEST_ERRORS_TOTAL metric - this should never happen")
});

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(SYNC_RUNS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SYNC_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SYNC_DURATION.clone()))?;
    REGISTRY.register(Box::new(RECORDS_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECORDS_REMOVED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SERVICE_ACCOUNTS_SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CLUSTER_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(CLUSTER_REQUEST_ERRORS_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_sync_runs() {
    SYNC_RUNS_TOTAL.inc();
}

pub fn increment_sync_failures(kind: &str) {
    SYNC_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn observe_sync_duration(duration: f64) {
    SYNC_DURATION.observe(duration);
}

/// `kind` is `namespace` or `service_account`
pub fn increment_records_created(kind: &str) {
    RECORDS_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_records_removed(kind: &str) {
    RECORDS_REMOVED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_service_accounts_skipped() {
    SERVICE_ACCOUNTS_SKIPPED_TOTAL.inc();
}

pub fn observe_cluster_request_duration(operation: &str, duration: f64) {
    CLUSTER_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_cluster_request_errors(operation: &str) {
    CLUSTER_REQUEST_ERRORS_TOTAL
        .with_label_values(&[operation])
        .inc();
}
