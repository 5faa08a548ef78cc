//! # Constants
//!
//! Shared constants used throughout the sync service.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

/// Default HTTP server port for the sync trigger, metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default upper bound for a single Kubernetes API round trip (seconds)
pub const DEFAULT_CLUSTER_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Service-account pruning is off unless explicitly enabled
pub const DEFAULT_PRUNE_SERVICE_ACCOUNTS: bool = false;

/// Visibility assigned to namespace records created by a sync
pub const DEFAULT_NAMESPACE_VISIBLE: bool = true;

/// Default URL `kpctl sync` posts to
pub const DEFAULT_SYNC_SERVER_URL: &str = "http://localhost:5000";

/// Default tracing filter when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_LOG_FILTER: &str = "kubeportal_sync=info";
