//! MCP Supervisor - tenant tool-server container supervisor
//!
//! This binary runs next to the container engine on a tool-server host,
//! keeping per-organization containers alive and polling their resource
//! usage for threshold alerts.

use anyhow::Result;
use std::sync::Arc;
use supervisor_lib::{
    health::{components, HealthRegistry},
    lifecycle::ContainerLifecycleManager,
    models::McpContainerConfig,
    monitor::{MonitorLoop, ResourceMonitor},
    observability::StructuredLogger,
    runtime::DockerCli,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SUPERVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting mcp-supervisor");

    // Load configuration
    let config = config::SupervisorConfig::load()?;
    info!(
        api_port = config.api_port,
        poll_interval_secs = config.poll_interval_secs,
        "Supervisor configured"
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::CONTAINER_RUNTIME);
    health_registry.register(components::LIFECYCLE_MANAGER);
    health_registry.register(components::RESOURCE_MONITOR);
    health_registry.register(components::POLLER);
    health_registry.register(components::API);

    // Probe the container runtime; the supervisor still serves its API when
    // the engine is unreachable, every query just degrades
    let runtime = Arc::new(DockerCli::with_config(config.docker_cli_config()));
    let runtime_version = match runtime.verify_binary().await {
        Ok(version) => version,
        Err(e) => {
            warn!(error = %e, "Container runtime probe failed");
            health_registry.set_unhealthy(components::CONTAINER_RUNTIME, e.to_string());
            "unavailable".to_string()
        }
    };

    let logger = StructuredLogger::new();
    logger.log_startup(SUPERVISOR_VERSION, &runtime_version);

    // Wire services
    let lifecycle = Arc::new(ContainerLifecycleManager::with_container_config(
        runtime.clone(),
        McpContainerConfig {
            image: config.mcp_image.clone(),
            ..Default::default()
        },
    ));
    let monitor = Arc::new(ResourceMonitor::new(runtime.clone(), lifecycle.clone()));
    let poller = Arc::new(MonitorLoop::new(monitor.clone(), config.poller_config()));

    poller.start().await;

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        lifecycle,
        monitor,
        poller.clone(),
    ));

    // Mark supervisor as ready after initialization
    health_registry.set_ready(true);

    // Start the admin API server
    let _api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    poller.stop().await;
    info!("Shutting down");

    Ok(())
}
