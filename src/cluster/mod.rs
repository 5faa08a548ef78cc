//! # Cluster Client Adapter
//!
//! Read-only view of the Kubernetes objects the portal mirrors.
//!
//! The adapter never writes to the cluster and never touches the mirror store.
//! Every failure, whether transport, authentication or timeout, is reported as
//! [`ClusterError::Unavailable`] and never retried here.

use crate::error::ClusterError;
use async_trait::async_trait;
use std::sync::Arc;

pub mod kubernetes;

pub use kubernetes::{KubeClusterClient, KubeConnector};

/// A namespace as listed by the API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNamespace {
    pub name: String,
    pub uid: String,
}

/// A service account as listed by the API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterServiceAccount {
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

/// Read access to cluster resources, one round trip per call
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, ClusterError>;

    /// Service accounts across all namespaces
    async fn list_service_accounts(&self) -> Result<Vec<ClusterServiceAccount>, ClusterError>;
}

/// Produces an authenticated client handle at the start of each sync run
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ClusterClient>, ClusterError>;
}
