//! Supervisor library for tenant MCP tool-server containers
//!
//! This crate provides the core functionality for:
//! - Per-organization container lifecycle management
//! - Resource usage monitoring through the container runtime CLI
//! - Threshold alerting and per-tenant summaries
//! - Background fleet polling
//! - Health checks and observability

pub mod health;
pub mod lifecycle;
pub mod models;
pub mod monitor;
pub mod naming;
pub mod observability;
pub mod runtime;

pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use lifecycle::ContainerLifecycleManager;
pub use models::*;
pub use monitor::{MonitorLoop, PollerConfig, ResourceMonitor};
pub use observability::{StructuredLogger, SupervisorMetrics};
pub use runtime::{ContainerRuntime, DockerCli, DockerCliConfig, RuntimeError, RuntimeStats};
