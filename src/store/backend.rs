//! Enum wrapper for mirror store backends
//!
//! Lets the binaries pick in-memory or database storage from configuration while
//! the reconciler only sees [`MirrorStore`].

use super::{
    DatabaseMirrorStore, InMemoryMirrorStore, MirrorStore, NamespaceRecord, ServiceAccountRecord,
};
use crate::error::StoreError;
use async_trait::async_trait;
use tracing::{info, warn};

/// Mirror store selected at startup
#[derive(Clone, Debug)]
pub enum MirrorStoreBackend {
    InMemory(InMemoryMirrorStore),
    Database(DatabaseMirrorStore),
}

impl MirrorStoreBackend {
    /// Connect to `database_url` when given, otherwise fall back to memory
    pub async fn from_database_url(database_url: Option<&str>) -> Result<Self, StoreError> {
        match database_url {
            Some(url) => {
                info!("Using database mirror store");
                Ok(Self::Database(DatabaseMirrorStore::connect(url).await?))
            }
            None => {
                warn!("DATABASE_URL not set - mirror records are kept in memory only");
                Ok(Self::InMemory(InMemoryMirrorStore::new()))
            }
        }
    }

    fn inner(&self) -> &dyn MirrorStore {
        match self {
            Self::InMemory(store) => store,
            Self::Database(store) => store,
        }
    }
}

#[async_trait]
impl MirrorStore for MirrorStoreBackend {
    async fn get_or_create_namespace(
        &self,
        name: &str,
        uid: &str,
    ) -> Result<(NamespaceRecord, bool), StoreError> {
        self.inner().get_or_create_namespace(name, uid).await
    }

    async fn all_namespaces(&self) -> Result<Vec<NamespaceRecord>, StoreError> {
        self.inner().all_namespaces().await
    }

    async fn delete_namespace(&self, record: &NamespaceRecord) -> Result<(), StoreError> {
        self.inner().delete_namespace(record).await
    }

    async fn find_namespace_by_name(&self, name: &str) -> Result<NamespaceRecord, StoreError> {
        self.inner().find_namespace_by_name(name).await
    }

    async fn create_local_namespace(&self, name: &str) -> Result<NamespaceRecord, StoreError> {
        self.inner().create_local_namespace(name).await
    }

    async fn get_or_create_service_account(
        &self,
        name: &str,
        uid: &str,
        namespace: &NamespaceRecord,
    ) -> Result<(ServiceAccountRecord, bool), StoreError> {
        self.inner()
            .get_or_create_service_account(name, uid, namespace)
            .await
    }

    async fn all_service_accounts(&self) -> Result<Vec<ServiceAccountRecord>, StoreError> {
        self.inner().all_service_accounts().await
    }

    async fn delete_service_account(
        &self,
        record: &ServiceAccountRecord,
    ) -> Result<(), StoreError> {
        self.inner().delete_service_account(record).await
    }
}
