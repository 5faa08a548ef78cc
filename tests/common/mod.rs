//! Common test utilities for integration tests
//!
//! A fake cluster whose contents can be changed between sync runs, plus helpers
//! for wiring it into a [`Reconciler`].

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use kubeportal_sync::cluster::{
    ClusterClient, ClusterConnector, ClusterNamespace, ClusterServiceAccount,
};
use kubeportal_sync::error::ClusterError;
use kubeportal_sync::reconciler::{ReconcileOptions, Reconciler};
use kubeportal_sync::store::{DatabaseMirrorStore, MirrorStore};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct FakeCluster {
    namespaces: Mutex<Vec<ClusterNamespace>>,
    service_accounts: Mutex<Vec<ClusterServiceAccount>>,
    failure: Mutex<Option<String>>,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_namespaces(self: Arc<Self>, namespaces: &[(&str, &str)]) -> Arc<Self> {
        self.set_namespaces(namespaces);
        self
    }

    pub fn set_namespaces(&self, namespaces: &[(&str, &str)]) {
        *self.namespaces.lock().unwrap() = namespaces
            .iter()
            .map(|(name, uid)| ClusterNamespace {
                name: (*name).to_string(),
                uid: (*uid).to_string(),
            })
            .collect();
    }

    /// Entries are `(namespace, name, uid)`
    pub fn set_service_accounts(&self, service_accounts: &[(&str, &str, &str)]) {
        *self.service_accounts.lock().unwrap() = service_accounts
            .iter()
            .map(|(namespace, name, uid)| ClusterServiceAccount {
                name: (*name).to_string(),
                namespace: (*namespace).to_string(),
                uid: (*uid).to_string(),
            })
            .collect();
    }

    /// Make every list call fail with `message`
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> Result<(), ClusterError> {
        match self.failure.lock().unwrap().as_deref() {
            Some(message) => Err(ClusterError::unavailable(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, ClusterError> {
        self.check()?;
        Ok(self.namespaces.lock().unwrap().clone())
    }

    async fn list_service_accounts(&self) -> Result<Vec<ClusterServiceAccount>, ClusterError> {
        self.check()?;
        Ok(self.service_accounts.lock().unwrap().clone())
    }
}

#[derive(Debug)]
pub struct FakeConnector(pub Arc<FakeCluster>);

#[async_trait]
impl ClusterConnector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn ClusterClient>, ClusterError> {
        Ok(Arc::clone(&self.0) as Arc<dyn ClusterClient>)
    }
}

/// Fresh SQLite in-memory mirror store
pub async fn sqlite_store() -> Arc<DatabaseMirrorStore> {
    Arc::new(
        DatabaseMirrorStore::connect("sqlite::memory:")
            .await
            .expect("Failed to open sqlite mirror store"),
    )
}

pub fn reconciler(
    cluster: &Arc<FakeCluster>,
    store: &Arc<DatabaseMirrorStore>,
    options: ReconcileOptions,
) -> Reconciler {
    Reconciler::new(
        Arc::new(FakeConnector(Arc::clone(cluster))),
        Arc::clone(store) as Arc<dyn MirrorStore>,
        options,
    )
}
