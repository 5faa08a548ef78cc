//! In-memory mirror store
//!
//! Ephemeral - data does not persist across restarts.
//! Thread-safe using Arc<RwLock> for concurrent access.

use super::{MirrorStore, NamespaceRecord, RecordId, ServiceAccountRecord};
use crate::constants::DEFAULT_NAMESPACE_VISIBLE;
use crate::error::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    next_id: RecordId,
    namespaces: Vec<NamespaceRecord>,
    service_accounts: Vec<ServiceAccountRecord>,
}

impl State {
    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }
}

/// Mirror store backed by process memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryMirrorStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryMirrorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MirrorStore for InMemoryMirrorStore {
    async fn get_or_create_namespace(
        &self,
        name: &str,
        uid: &str,
    ) -> Result<(NamespaceRecord, bool), StoreError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .namespaces
            .iter()
            .find(|ns| ns.name == name && ns.uid.as_deref() == Some(uid))
        {
            return Ok((existing.clone(), false));
        }

        let record = NamespaceRecord {
            id: state.allocate_id(),
            name: name.to_string(),
            uid: Some(uid.to_string()),
            visible: DEFAULT_NAMESPACE_VISIBLE,
        };
        state.namespaces.push(record.clone());
        debug!(namespace = name, uid, "stored namespace record");
        Ok((record, true))
    }

    async fn all_namespaces(&self) -> Result<Vec<NamespaceRecord>, StoreError> {
        let state = self.state.read().await;
        let mut namespaces = state.namespaces.clone();
        namespaces.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(namespaces)
    }

    async fn delete_namespace(&self, record: &NamespaceRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.namespaces.retain(|ns| ns.id != record.id);
        state
            .service_accounts
            .retain(|sa| sa.namespace_id != record.id);
        Ok(())
    }

    async fn find_namespace_by_name(&self, name: &str) -> Result<NamespaceRecord, StoreError> {
        let state = self.state.read().await;
        state
            .namespaces
            .iter()
            .filter(|ns| ns.name == name)
            .min_by_key(|ns| ns.id)
            .cloned()
            .ok_or_else(|| StoreError::NamespaceNotFound {
                name: name.to_string(),
            })
    }

    async fn create_local_namespace(&self, name: &str) -> Result<NamespaceRecord, StoreError> {
        let mut state = self.state.write().await;
        let record = NamespaceRecord {
            id: state.allocate_id(),
            name: name.to_string(),
            uid: None,
            visible: DEFAULT_NAMESPACE_VISIBLE,
        };
        state.namespaces.push(record.clone());
        Ok(record)
    }

    async fn get_or_create_service_account(
        &self,
        name: &str,
        uid: &str,
        namespace: &NamespaceRecord,
    ) -> Result<(ServiceAccountRecord, bool), StoreError> {
        let mut state = self.state.write().await;
        if !state.namespaces.iter().any(|ns| ns.id == namespace.id) {
            return Err(StoreError::NamespaceNotFound {
                name: namespace.name.clone(),
            });
        }
        if let Some(existing) = state.service_accounts.iter().find(|sa| {
            sa.name == name && sa.uid.as_deref() == Some(uid) && sa.namespace_id == namespace.id
        }) {
            return Ok((existing.clone(), false));
        }

        let record = ServiceAccountRecord {
            id: state.allocate_id(),
            name: name.to_string(),
            uid: Some(uid.to_string()),
            namespace_id: namespace.id,
        };
        state.service_accounts.push(record.clone());
        Ok((record, true))
    }

    async fn all_service_accounts(&self) -> Result<Vec<ServiceAccountRecord>, StoreError> {
        let state = self.state.read().await;
        let mut accounts = state.service_accounts.clone();
        accounts.sort_by(|a, b| {
            a.namespace_id
                .cmp(&b.namespace_id)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(accounts)
    }

    async fn delete_service_account(
        &self,
        record: &ServiceAccountRecord,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.service_accounts.retain(|sa| sa.id != record.id);
        Ok(())
    }
}
