//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use kubeportal_sync::prelude::*;
//! ```

// Cluster seam
pub use crate::cluster::{
    ClusterClient, ClusterConnector, ClusterNamespace, ClusterServiceAccount, KubeConnector,
};

// Mirror store seam
pub use crate::store::{
    DatabaseMirrorStore, InMemoryMirrorStore, MirrorStore, MirrorStoreBackend, NamespaceRecord,
    ServiceAccountRecord,
};

// Reconciler types
pub use crate::reconciler::{
    LogEntry, LogLevel, ReconcileOptions, Reconciler, SyncPhase, SyncReport, SyncStats,
};

pub use crate::config::ControllerConfig;
pub use crate::error::{ClusterError, StoreError, SyncError};
