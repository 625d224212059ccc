//! HTTP API for tenant administration, health checks and Prometheus metrics

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use supervisor_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    lifecycle::ContainerLifecycleManager,
    models::McpInstallRequest,
    monitor::{MonitorLoop, ResourceMonitor},
};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub lifecycle: Arc<ContainerLifecycleManager>,
    pub monitor: Arc<ResourceMonitor>,
    pub poller: Arc<MonitorLoop>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        lifecycle: Arc<ContainerLifecycleManager>,
        monitor: Arc<ResourceMonitor>,
        poller: Arc<MonitorLoop>,
    ) -> Self {
        Self {
            health_registry,
            lifecycle,
            monitor,
            poller,
        }
    }
}

/// Install request body; the organization comes from the path
#[derive(Debug, Deserialize)]
struct InstallMcpBody {
    name: String,
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    version: Option<String>,
}

/// Health check response - returns 200 if healthy, 503 if degraded/unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health();

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness();

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Summaries for every tenant with a container
async fn list_summaries(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.monitor.all_organization_summaries().await)
}

/// Full summary for one tenant
async fn organization_summary(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> impl IntoResponse {
    Json(state.monitor.organization_summary(&organization_id, None).await)
}

/// Current usage reading for one tenant
///
/// A stopped or missing container is a normal state, so the reading is
/// `null` rather than an error response.
async fn organization_usage(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> impl IntoResponse {
    let usage = state.monitor.resource_usage(&organization_id).await;
    Json(json!({
        "organization_id": organization_id,
        "usage": usage,
    }))
}

/// Installed MCP tools for one tenant
async fn list_mcps(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> impl IntoResponse {
    Json(state.lifecycle.mcp_status(&organization_id).await)
}

/// Install an MCP tool into a tenant's container
async fn install_mcp(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
    Json(body): Json<InstallMcpBody>,
) -> Response {
    let request = McpInstallRequest {
        organization_id,
        name: body.name,
        command: body.command,
        args: body.args,
        env: body.env,
        version: body.version,
    };

    match state.lifecycle.install_mcp(&request).await {
        Ok(status) => (StatusCode::CREATED, Json(status)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", e) })),
        )
            .into_response(),
    }
}

/// Create or start the tenant's container
async fn start_container(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Response {
    match state.lifecycle.ensure_running(&organization_id).await {
        Ok(()) => Json(json!({
            "organization_id": organization_id,
            "status": "running"
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", e) })),
        )
            .into_response(),
    }
}

/// Stop the tenant's container
async fn stop_container(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Response {
    match state.lifecycle.stop_container(&organization_id).await {
        Ok(()) => Json(json!({
            "organization_id": organization_id,
            "status": "stopped"
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", e) })),
        )
            .into_response(),
    }
}

/// Whether the background poller is running
async fn monitoring_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "running": state.poller.is_running().await }))
}

/// Start the background poller
async fn start_monitoring(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.poller.start().await;
    state.health_registry.set_healthy(components::POLLER);
    Json(json!({ "running": true }))
}

/// Stop the background poller
async fn stop_monitoring(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.poller.stop().await;
    state
        .health_registry
        .set_degraded(components::POLLER, "Monitoring stopped by operator");
    Json(json!({ "running": false }))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/summaries", get(list_summaries))
        .route(
            "/api/v1/organizations/:organization_id/summary",
            get(organization_summary),
        )
        .route(
            "/api/v1/organizations/:organization_id/usage",
            get(organization_usage),
        )
        .route(
            "/api/v1/organizations/:organization_id/mcps",
            get(list_mcps).post(install_mcp),
        )
        .route(
            "/api/v1/organizations/:organization_id/container/start",
            post(start_container),
        )
        .route(
            "/api/v1/organizations/:organization_id/container/stop",
            post(stop_container),
        )
        .route("/api/v1/monitoring", get(monitoring_status))
        .route("/api/v1/monitoring/start", post(start_monitoring))
        .route("/api/v1/monitoring/stop", post(stop_monitoring))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
