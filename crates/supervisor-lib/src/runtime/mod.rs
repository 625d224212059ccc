//! Container runtime access
//!
//! This module wraps the Docker-compatible CLI the supervisor manages tenant
//! containers through. Two narrow traits split the surface: `RuntimeStats`
//! covers the textual stats/listing queries the resource monitor consumes,
//! `ContainerRuntime` covers the lifecycle operations. `DockerCli` implements
//! both; tests substitute mocks so no container engine is required.

mod docker;
mod stats;

pub use docker::{DockerCli, DockerCliConfig};
pub use stats::parse_stats_line;

use crate::models::McpContainerConfig;

pub use async_trait::async_trait;

/// Errors from container runtime commands
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("container runtime binary not found: {0}")]
    BinaryNotFound(String),

    #[error("runtime command failed: {command}: {message}")]
    CommandFailed { command: String, message: String },

    #[error("runtime command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only stats and listing queries against the container runtime
///
/// Output is the runtime's textual table format; parsing happens in
/// [`parse_stats_line`] so it stays unit-testable without an engine.
#[async_trait]
pub trait RuntimeStats: Send + Sync {
    /// Stats table for a single container: header line plus one data row
    async fn stats_by_name(&self, container_name: &str) -> Result<String, RuntimeError>;

    /// Stats table for every running container whose name matches the filter
    async fn stats_by_filter(&self, name_filter: &str) -> Result<String, RuntimeError>;

    /// Names of all containers (including stopped) matching the filter
    async fn list_by_filter(&self, name_filter: &str) -> Result<Vec<String>, RuntimeError>;
}

/// Lifecycle operations on tenant containers
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Whether a container with this exact name exists in any state
    async fn container_exists(&self, container_name: &str) -> Result<bool, RuntimeError>;

    /// Whether the container is currently running
    async fn container_running(&self, container_name: &str) -> Result<bool, RuntimeError>;

    /// Create and start a container, returning the runtime-assigned id
    async fn create_container(
        &self,
        container_name: &str,
        config: &McpContainerConfig,
    ) -> Result<String, RuntimeError>;

    /// Start an existing stopped container
    async fn start_container(&self, container_name: &str) -> Result<(), RuntimeError>;

    /// Stop a running container
    async fn stop_container(&self, container_name: &str) -> Result<(), RuntimeError>;

    /// Run a command inside a running container, returning stdout
    async fn exec_in_container(
        &self,
        container_name: &str,
        command: &[String],
    ) -> Result<String, RuntimeError>;
}
