//! # Kubernetes Adapter
//!
//! [`ClusterClient`] over the `kube` client. Each call is a single unpaginated
//! list request bounded by the configured timeout.

use super::{ClusterClient, ClusterConnector, ClusterNamespace, ClusterServiceAccount};
use crate::error::ClusterError;
use crate::observability::metrics;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ListParams};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Loads client configuration on every sync run
///
/// With a context name the kubeconfig is read directly; otherwise the usual
/// inference applies (`KUBECONFIG`, `~/.kube/config`, then in-cluster service account).
#[derive(Debug, Clone)]
pub struct KubeConnector {
    context: Option<String>,
    timeout: Duration,
}

impl KubeConnector {
    pub fn new(context: Option<String>, timeout: Duration) -> Self {
        Self { context, timeout }
    }

    async fn load_config(&self) -> Result<Config, ClusterError> {
        match &self.context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..KubeConfigOptions::default()
                };
                Config::from_kubeconfig(&options).await.map_err(|e| {
                    ClusterError::unavailable(format!(
                        "Failed to load kubeconfig context '{context}': {e}"
                    ))
                })
            }
            None => Config::infer().await.map_err(|e| {
                ClusterError::unavailable(format!(
                    "Failed to load Kubernetes client configuration: {e}"
                ))
            }),
        }
    }
}

#[async_trait]
impl ClusterConnector for KubeConnector {
    async fn connect(&self) -> Result<Arc<dyn ClusterClient>, ClusterError> {
        let config = self.load_config().await?;
        debug!(cluster_url = %config.cluster_url, "Loaded Kubernetes client configuration");
        let client = Client::try_from(config)?;
        Ok(Arc::new(KubeClusterClient::new(client, self.timeout)))
    }
}

/// Read-only cluster access through the Kubernetes API
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    timeout: Duration,
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl KubeClusterClient {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Run one API call under the timeout and record its duration
    async fn bounded<T, F>(&self, operation: &'static str, request: F) -> Result<T, ClusterError>
    where
        F: Future<Output = Result<T, kube::Error>> + Send,
    {
        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, request).await;
        metrics::observe_cluster_request_duration(operation, start.elapsed().as_secs_f64());

        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                metrics::increment_cluster_request_errors(operation);
                Err(e.into())
            }
            Err(_) => {
                metrics::increment_cluster_request_errors(operation);
                Err(ClusterError::unavailable(format!(
                    "Kubernetes API request {operation} timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = self
            .bounded("list_namespaces", api.list(&ListParams::default()))
            .await?;
        Ok(list
            .items
            .iter()
            .filter_map(|ns| namespace_from_meta(&ns.metadata))
            .collect())
    }

    async fn list_service_accounts(&self) -> Result<Vec<ClusterServiceAccount>, ClusterError> {
        let api: Api<ServiceAccount> = Api::all(self.client.clone());
        let list = self
            .bounded("list_service_accounts", api.list(&ListParams::default()))
            .await?;
        Ok(list
            .items
            .iter()
            .filter_map(|sa| service_account_from_meta(&sa.metadata))
            .collect())
    }
}

fn namespace_from_meta(meta: &ObjectMeta) -> Option<ClusterNamespace> {
    match (&meta.name, &meta.uid) {
        (Some(name), Some(uid)) => Some(ClusterNamespace {
            name: name.clone(),
            uid: uid.clone(),
        }),
        _ => {
            warn!(name = ?meta.name, "Ignoring namespace without name or uid");
            None
        }
    }
}

fn service_account_from_meta(meta: &ObjectMeta) -> Option<ClusterServiceAccount> {
    match (&meta.name, &meta.namespace, &meta.uid) {
        (Some(name), Some(namespace), Some(uid)) => Some(ClusterServiceAccount {
            name: name.clone(),
            namespace: namespace.clone(),
            uid: uid.clone(),
        }),
        _ => {
            warn!(name = ?meta.name, namespace = ?meta.namespace, "Ignoring service account without name, namespace or uid");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: Option<&str>, namespace: Option<&str>, uid: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name: name.map(str::to_string),
            namespace: namespace.map(str::to_string),
            uid: uid.map(str::to_string),
            ..ObjectMeta::default()
        }
    }

    #[test]
    fn test_namespace_from_meta() {
        let ns = namespace_from_meta(&meta(Some("default"), None, Some("uid-1"))).unwrap();
        assert_eq!(
            ns,
            ClusterNamespace {
                name: "default".to_string(),
                uid: "uid-1".to_string()
            }
        );
    }

    #[test]
    fn test_namespace_without_uid_is_ignored() {
        assert!(namespace_from_meta(&meta(Some("default"), None, None)).is_none());
        assert!(namespace_from_meta(&meta(None, None, Some("uid-1"))).is_none());
    }

    #[test]
    fn test_service_account_from_meta() {
        let sa =
            service_account_from_meta(&meta(Some("builder"), Some("team-a"), Some("sa-uid"))).unwrap();
        assert_eq!(sa.name, "builder");
        assert_eq!(sa.namespace, "team-a");
        assert_eq!(sa.uid, "sa-uid");
    }

    /// Client whose API server accepts requests and never answers
    fn unresponsive_client() -> Client {
        let service = tower::service_fn(|_request: axum::http::Request<kube::client::Body>| {
            std::future::pending::<
                Result<axum::http::Response<kube::client::Body>, std::convert::Infallible>,
            >()
        });
        Client::new(service, "default")
    }

    #[tokio::test]
    async fn test_list_namespaces_times_out() {
        let client = KubeClusterClient::new(unresponsive_client(), Duration::from_millis(50));

        let err = client.list_namespaces().await.unwrap_err();

        assert_eq!(
            err,
            ClusterError::unavailable("Kubernetes API request list_namespaces timed out after 50ms")
        );
    }

    #[tokio::test]
    async fn test_list_service_accounts_times_out() {
        let client = KubeClusterClient::new(unresponsive_client(), Duration::from_millis(50));

        let err = client.list_service_accounts().await.unwrap_err();

        assert!(matches!(err, ClusterError::Unavailable { .. }));
        assert!(err.to_string().contains("list_service_accounts timed out"), "{err}");
    }

    #[test]
    fn test_service_account_without_namespace_is_ignored() {
        assert!(service_account_from_meta(&meta(Some("builder"), None, Some("sa-uid"))).is_none());
    }
}
