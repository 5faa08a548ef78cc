//! # Mirror Store
//!
//! Persisted copy of the cluster's namespaces and service accounts.
//!
//! Records are matched on their Kubernetes uid once known. A namespace record
//! without a uid is one an operator created in the portal that does not exist in
//! the cluster yet.
//!
//! Backends:
//! - [`InMemoryMirrorStore`]: process-local, used for dry runs and tests
//! - [`DatabaseMirrorStore`]: SeaORM over PostgreSQL or SQLite
//! - [`MirrorStoreBackend`]: picks one of the above from configuration

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;

pub mod backend;
pub mod database;
pub mod entities;
pub mod memory;

pub use backend::MirrorStoreBackend;
pub use database::DatabaseMirrorStore;
pub use memory::InMemoryMirrorStore;

/// Store-assigned primary key
pub type RecordId = i32;

/// Portal record for a Kubernetes namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceRecord {
    pub id: RecordId,
    pub name: String,
    /// Kubernetes uid; `None` until the namespace exists in the cluster
    pub uid: Option<String>,
    /// Portal-only flag, never read from or written to the cluster
    pub visible: bool,
}

/// Portal record for a Kubernetes service account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccountRecord {
    pub id: RecordId,
    pub name: String,
    pub uid: Option<String>,
    pub namespace_id: RecordId,
}

/// Persistence operations the reconciler relies on.
///
/// Implementations must keep service accounts attached to an existing namespace:
/// deleting a namespace record removes its service account records.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Return the record matching `(name, uid)` or create it. The flag is `true`
    /// when a record was created.
    async fn get_or_create_namespace(
        &self,
        name: &str,
        uid: &str,
    ) -> Result<(NamespaceRecord, bool), StoreError>;

    /// All namespace records, ordered by name
    async fn all_namespaces(&self) -> Result<Vec<NamespaceRecord>, StoreError>;

    /// Remove a namespace record together with its service accounts
    async fn delete_namespace(&self, record: &NamespaceRecord) -> Result<(), StoreError>;

    /// Lookup by name. When several records share a name the oldest wins.
    async fn find_namespace_by_name(&self, name: &str) -> Result<NamespaceRecord, StoreError>;

    /// Add a namespace the operator wants provisioned in the cluster
    async fn create_local_namespace(&self, name: &str) -> Result<NamespaceRecord, StoreError>;

    /// Return the record matching `(name, uid, namespace)` or create it
    async fn get_or_create_service_account(
        &self,
        name: &str,
        uid: &str,
        namespace: &NamespaceRecord,
    ) -> Result<(ServiceAccountRecord, bool), StoreError>;

    /// All service account records, ordered by namespace id then name
    async fn all_service_accounts(&self) -> Result<Vec<ServiceAccountRecord>, StoreError>;

    async fn delete_service_account(&self, record: &ServiceAccountRecord)
        -> Result<(), StoreError>;
}
