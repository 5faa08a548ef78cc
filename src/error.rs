//! # Errors
//!
//! Typed failures raised while mirroring the cluster into the portal database.
//!
//! - [`ClusterError`] comes from the Kubernetes adapter.
//! - [`StoreError`] comes from the mirror store.
//! - [`SyncError`] is what the reconciler reports. Only
//!   [`SyncError::DanglingServiceAccountNamespace`] is recoverable; every other
//!   variant aborts the run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure talking to the Kubernetes API server
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    /// Transport, authentication or timeout failure. The message is the API
    /// server's own `message` field when one was returned.
    #[error("{message}")]
    Unavailable { message: String },
}

impl ClusterError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match err {
            // The status body carries the operator-facing explanation
            kube::Error::Api(api_err) if !api_err.message.is_empty() => {
                Self::unavailable(api_err.message.clone())
            }
            other => Self::unavailable(other.to_string()),
        }
    }
}

/// Failure reading or writing the mirror store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no namespace record named '{name}'")]
    NamespaceNotFound { name: String },

    #[error("mirror store unavailable: {0}")]
    Unavailable(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Errors surfaced by a sync run
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SyncError {
    #[error("{0}")]
    ClusterUnavailable(String),

    #[error("{0}")]
    StoreUnavailable(String),

    /// The cluster lists a service account in a namespace the portal does not know.
    #[error("Skipping {namespace}:{name}, namespace does not exist.")]
    DanglingServiceAccountNamespace { namespace: String, name: String },

    /// A portal namespace record without a uid. Provisioning it in Kubernetes is not
    /// implemented, so the run stops instead of guessing.
    #[error("Namespace '{name}' exists only in the portal; creating it in Kubernetes is not implemented")]
    OrphanLocalNamespace { name: String },

    /// A namespace record disappeared from the store while the run was using it.
    #[error("Portal record for namespace '{name}' vanished during synchronization")]
    NamespaceRecordMissing { name: String },
}

impl SyncError {
    /// Whether this error aborts the remaining passes
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DanglingServiceAccountNamespace { .. })
    }

    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClusterUnavailable(_) => "cluster_unavailable",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::DanglingServiceAccountNamespace { .. } => "dangling_service_account_namespace",
            Self::OrphanLocalNamespace { .. } => "orphan_local_namespace",
            Self::NamespaceRecordMissing { .. } => "namespace_record_missing",
        }
    }
}

impl From<ClusterError> for SyncError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::Unavailable { message } => Self::ClusterUnavailable(message),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NamespaceNotFound { name } => Self::NamespaceRecordMissing { name },
            other @ StoreError::Unavailable(_) => Self::StoreUnavailable(other.to_string()),
        }
    }
}
