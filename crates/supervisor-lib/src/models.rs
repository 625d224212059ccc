//! Core data models for the MCP supervisor

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default per-tenant memory ceiling
pub const DEFAULT_MEMORY_LIMIT: &str = "1G";
/// Default per-tenant CPU ceiling in core-equivalents
pub const DEFAULT_CPU_LIMIT: f64 = 0.5;
/// Default maximum number of installed MCP tool integrations
pub const DEFAULT_MAX_MCPS: u32 = 10;
/// Default per-tenant storage ceiling
pub const DEFAULT_STORAGE_LIMIT: &str = "2G";
/// Default per-tenant network budget in MB per month
pub const DEFAULT_NETWORK_LIMIT_MB: u64 = 1000;

/// One point-in-time resource reading for a tenant's container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub organization_id: String,
    pub container_id: String,
    pub container_name: String,
    pub cpu_percent: f64,
    pub memory_usage: String,
    pub memory_limit: String,
    pub memory_percent: f64,
    pub network_in: String,
    pub network_out: String,
    pub block_in: String,
    pub block_out: String,
    pub pids: u32,
    pub timestamp: i64,
}

/// Per-tenant resource ceilings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub organization_id: String,
    pub memory_limit: String,
    pub cpu_limit: f64,
    pub max_mcps: u32,
    pub storage_limit: String,
    pub network_limit_mb: u64,
}

impl ResourceLimits {
    /// Process-wide default limits for an organization
    pub fn defaults_for(organization_id: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
            cpu_limit: DEFAULT_CPU_LIMIT,
            max_mcps: DEFAULT_MAX_MCPS,
            storage_limit: DEFAULT_STORAGE_LIMIT.to_string(),
            network_limit_mb: DEFAULT_NETWORK_LIMIT_MB,
        }
    }

    /// Shallow-merge caller-supplied overrides onto these limits
    pub fn merged_with(mut self, overrides: &LimitOverrides) -> Self {
        if let Some(ref memory_limit) = overrides.memory_limit {
            self.memory_limit = memory_limit.clone();
        }
        if let Some(cpu_limit) = overrides.cpu_limit {
            self.cpu_limit = cpu_limit;
        }
        if let Some(max_mcps) = overrides.max_mcps {
            self.max_mcps = max_mcps;
        }
        if let Some(ref storage_limit) = overrides.storage_limit {
            self.storage_limit = storage_limit.clone();
        }
        if let Some(network_limit_mb) = overrides.network_limit_mb {
            self.network_limit_mb = network_limit_mb;
        }
        self
    }
}

/// Partial limit overrides supplied per call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitOverrides {
    pub memory_limit: Option<String>,
    pub cpu_limit: Option<f64>,
    pub max_mcps: Option<u32>,
    pub storage_limit: Option<String>,
    pub network_limit_mb: Option<u64>,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Which metric an alert concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Memory,
    Cpu,
    Storage,
    Network,
    Mcps,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Memory => write!(f, "memory"),
            AlertKind::Cpu => write!(f, "cpu"),
            AlertKind::Storage => write!(f, "storage"),
            AlertKind::Network => write!(f, "network"),
            AlertKind::Mcps => write!(f, "mcps"),
        }
    }
}

/// One triggered threshold violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAlert {
    pub organization_id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
    pub limit_value: f64,
    pub timestamp: i64,
}

/// Observed state of a tenant's container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Running,
    Stopped,
    NotFound,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::Running => write!(f, "running"),
            ContainerStatus::Stopped => write!(f, "stopped"),
            ContainerStatus::NotFound => write!(f, "not_found"),
        }
    }
}

/// Consolidated snapshot of one tenant's container health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub organization_id: String,
    pub container_status: ContainerStatus,
    pub resource_usage: Option<ResourceUsage>,
    pub limits: ResourceLimits,
    pub mcp_count: usize,
    pub alerts: Vec<ResourceAlert>,
    pub last_updated: i64,
}

/// Identity of a managed tenant container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub container_id: String,
    pub container_name: String,
    pub organization_id: String,
    pub status: ContainerStatus,
}

/// State of one installed MCP tool integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpState {
    Running,
    Stopped,
    Error,
}

/// One installed MCP tool integration and its state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpStatus {
    pub name: String,
    pub state: McpState,
    pub version: Option<String>,
    pub installed_at: i64,
}

/// Request to install an MCP tool into a tenant's container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpInstallRequest {
    pub organization_id: String,
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for creating a tenant container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpContainerConfig {
    pub image: String,
    pub memory_limit: String,
    pub cpu_limit: f64,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Default for McpContainerConfig {
    fn default() -> Self {
        Self {
            image: "teamhub/mcp-runtime:latest".to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
            cpu_limit: DEFAULT_CPU_LIMIT,
            env: HashMap::new(),
        }
    }
}
