//! # HTTP Server
//!
//! Sync trigger, metrics and Kubernetes probes.
//!
//! Provides endpoints:
//! - `POST /sync` - Run one synchronization and return its report as JSON
//!   (200 when it completed, 500 when it failed)
//! - `/metrics` - Prometheus metrics in text format
//! - `/healthz` - Liveness probe (always returns 200)
//! - `/readyz` - Readiness probe (returns 200 once the listener is bound)
//!
//! The server runs on port 5000 by default (configurable via `METRICS_PORT` environment variable).

use crate::observability::metrics::REGISTRY;
use crate::reconciler::Reconciler;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct ServerState {
    pub reconciler: Arc<Reconciler>,
    pub is_ready: Arc<AtomicBool>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("is_ready", &self.is_ready.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ServerState {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self {
            reconciler,
            is_ready: Arc::new(AtomicBool::new(false)),
        }
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/sync", post(sync_handler))
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener, mark the state ready and serve until the process exits
pub async fn start_server(port: u16, state: Arc<ServerState>) -> Result<(), anyhow::Error> {
    let app = router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    info!("HTTP server listening on {}", addr);
    state.is_ready.store(true, Ordering::Relaxed);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn sync_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let report = state.reconciler.run_sync().await;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}

async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    )
}

async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn readyz_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.is_ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::testing::{ScriptedCluster, ScriptedConnector};
    use crate::reconciler::ReconcileOptions;
    use crate::store::{InMemoryMirrorStore, MirrorStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(cluster: &Arc<ScriptedCluster>) -> Arc<ServerState> {
        let reconciler = Reconciler::new(
            Arc::new(ScriptedConnector(Arc::clone(cluster))),
            Arc::new(InMemoryMirrorStore::new()) as Arc<dyn MirrorStore>,
            ReconcileOptions::default(),
        );
        Arc::new(ServerState::new(Arc::new(reconciler)))
    }

    async fn post_sync(state: Arc<ServerState>) -> (StatusCode, serde_json::Value) {
        let response = router(state)
            .oneshot(Request::post("/sync").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_sync_returns_report_on_success() {
        let cluster = ScriptedCluster::new(&[("default", "uid-1")], &[]);

        let (status, body) = post_sync(state(&cluster)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "completed");
        assert_eq!(body["stats"]["namespaces_created"], 1);
        assert_eq!(body["entries"][0]["message"], "Starting synchronization ...");
    }

    #[tokio::test]
    async fn test_sync_failure_is_server_error() {
        let cluster = ScriptedCluster::new(&[], &[]);
        cluster.fail_namespaces("Unauthorized");

        let (status, body) = post_sync(state(&cluster)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["phase"], "failed");
        assert_eq!(body["failed_phase"], "namespace_pass");
        assert_eq!(body["error"]["kind"], "cluster_unavailable");
    }

    #[tokio::test]
    async fn test_readyz_follows_ready_flag() {
        let cluster = ScriptedCluster::new(&[], &[]);
        let state = state(&cluster);

        let response = router(Arc::clone(&state))
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.is_ready.store(true, Ordering::Relaxed);
        let response = router(state)
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_is_always_ok() {
        let cluster = ScriptedCluster::new(&[], &[]);
        let response = router(state(&cluster))
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sync_get_is_not_allowed() {
        let cluster = ScriptedCluster::new(&[], &[]);
        let response = router(state(&cluster))
            .oneshot(Request::get("/sync").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
