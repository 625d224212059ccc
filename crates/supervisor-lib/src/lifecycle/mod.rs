//! Tenant container lifecycle management
//!
//! One logical manager per process owns container existence/running checks
//! and the set of MCP tool integrations installed in each tenant's container.
//! Read-side queries absorb runtime errors into negative results so an
//! aggregate caller (the resource monitor) is never aborted by one tenant;
//! mutators return errors for administrative callers to surface.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::models::{
    ContainerInfo, ContainerStatus, McpContainerConfig, McpInstallRequest, McpState, McpStatus,
};
use crate::naming;
use crate::observability::SupervisorMetrics;
use crate::runtime::ContainerRuntime;

/// Helper binary shipped in the tool-server image that registers MCP servers
const INSTALL_HELPER: &str = "mcp-hub";

/// One installed (or failed-install) tool integration for a tenant
#[derive(Debug, Clone)]
struct McpRecord {
    name: String,
    version: Option<String>,
    installed_at: i64,
    install_failed: bool,
}

/// Sole authority over tenant container state and installed tools
pub struct ContainerLifecycleManager {
    runtime: Arc<dyn ContainerRuntime>,
    /// Parameters for containers this manager creates on demand
    container_config: McpContainerConfig,
    /// organization_id -> installed tool records
    installed: DashMap<String, Vec<McpRecord>>,
    metrics: SupervisorMetrics,
}

impl ContainerLifecycleManager {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self::with_container_config(runtime, McpContainerConfig::default())
    }

    pub fn with_container_config(
        runtime: Arc<dyn ContainerRuntime>,
        container_config: McpContainerConfig,
    ) -> Self {
        Self {
            runtime,
            container_config,
            installed: DashMap::new(),
            metrics: SupervisorMetrics::new(),
        }
    }

    /// Whether the tenant's container exists in any state
    ///
    /// Runtime errors degrade to `false`.
    pub async fn container_exists(&self, organization_id: &str) -> bool {
        let name = naming::container_name(organization_id);
        match self.runtime.container_exists(&name).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(
                    organization_id = %organization_id,
                    error = %e,
                    "container existence check failed"
                );
                false
            }
        }
    }

    /// Whether the tenant's container is currently running
    ///
    /// Runtime errors degrade to `false`.
    pub async fn is_container_running(&self, organization_id: &str) -> bool {
        let name = naming::container_name(organization_id);
        match self.runtime.container_running(&name).await {
            Ok(running) => running,
            Err(e) => {
                warn!(
                    organization_id = %organization_id,
                    error = %e,
                    "container running check failed"
                );
                false
            }
        }
    }

    /// Installed tool integrations and their per-tool state
    ///
    /// A stopped container reports every installed tool as stopped; a failed
    /// install stays visible in the error state. Never fails; an unknown
    /// tenant yields an empty list.
    pub async fn mcp_status(&self, organization_id: &str) -> Vec<McpStatus> {
        let records = match self.installed.get(organization_id) {
            Some(entry) => entry.value().clone(),
            None => return Vec::new(),
        };

        let running = self.is_container_running(organization_id).await;

        records
            .into_iter()
            .map(|record| McpStatus {
                name: record.name,
                state: if record.install_failed {
                    McpState::Error
                } else if running {
                    McpState::Running
                } else {
                    McpState::Stopped
                },
                version: record.version,
                installed_at: record.installed_at,
            })
            .collect()
    }

    /// Create and start the tenant's container
    pub async fn create_container(
        &self,
        organization_id: &str,
        config: &McpContainerConfig,
    ) -> Result<ContainerInfo> {
        let name = naming::container_name(organization_id);
        let container_id = self
            .runtime
            .create_container(&name, config)
            .await
            .with_context(|| format!("failed to create container for {}", organization_id))?;

        info!(
            organization_id = %organization_id,
            container = %name,
            "tenant container created"
        );

        Ok(ContainerInfo {
            container_id,
            container_name: name,
            organization_id: organization_id.to_string(),
            status: ContainerStatus::Running,
        })
    }

    /// Start an existing stopped tenant container
    pub async fn start_container(&self, organization_id: &str) -> Result<()> {
        let name = naming::container_name(organization_id);
        self.runtime
            .start_container(&name)
            .await
            .with_context(|| format!("failed to start container for {}", organization_id))?;
        info!(organization_id = %organization_id, "tenant container started");
        Ok(())
    }

    /// Stop the tenant's running container
    pub async fn stop_container(&self, organization_id: &str) -> Result<()> {
        let name = naming::container_name(organization_id);
        self.runtime
            .stop_container(&name)
            .await
            .with_context(|| format!("failed to stop container for {}", organization_id))?;
        info!(organization_id = %organization_id, "tenant container stopped");
        Ok(())
    }

    /// Make sure the tenant's container exists and is running
    ///
    /// Creates the container from the manager's configured parameters when it
    /// is missing, starts it when it is stopped.
    pub async fn ensure_running(&self, organization_id: &str) -> Result<()> {
        let name = naming::container_name(organization_id);

        let exists = self
            .runtime
            .container_exists(&name)
            .await
            .with_context(|| format!("failed to check container for {}", organization_id))?;

        if !exists {
            self.create_container(organization_id, &self.container_config)
                .await?;
            return Ok(());
        }

        let running = self
            .runtime
            .container_running(&name)
            .await
            .with_context(|| format!("failed to check container state for {}", organization_id))?;

        if !running {
            self.start_container(organization_id).await?;
        }
        Ok(())
    }

    /// Install an MCP tool integration into the tenant's container
    ///
    /// Creates/starts the container if needed, runs the in-container install
    /// helper, and records the tool. A failed install is recorded in the
    /// error state so it stays visible to `mcp_status`.
    pub async fn install_mcp(&self, request: &McpInstallRequest) -> Result<McpStatus> {
        let organization_id = &request.organization_id;
        self.ensure_running(organization_id).await?;

        let name = naming::container_name(organization_id);
        let command = Self::install_command(request);
        debug!(
            organization_id = %organization_id,
            mcp = %request.name,
            "installing MCP tool"
        );

        let installed_at = Utc::now().timestamp();
        let result = self.runtime.exec_in_container(&name, &command).await;

        let install_failed = result.is_err();
        self.record_install(organization_id, request, installed_at, install_failed);
        self.metrics.inc_mcp_installs(!install_failed);

        match result {
            Ok(_) => {
                info!(
                    organization_id = %organization_id,
                    mcp = %request.name,
                    "MCP tool installed"
                );
                Ok(McpStatus {
                    name: request.name.clone(),
                    state: McpState::Running,
                    version: request.version.clone(),
                    installed_at,
                })
            }
            Err(e) => Err(e).with_context(|| {
                format!(
                    "failed to install MCP tool {} for {}",
                    request.name, organization_id
                )
            }),
        }
    }

    /// Argument vector for the in-container install helper
    fn install_command(request: &McpInstallRequest) -> Vec<String> {
        let mut command = vec![
            INSTALL_HELPER.to_string(),
            "install".to_string(),
            "--name".to_string(),
            request.name.clone(),
            "--command".to_string(),
            request.command.clone(),
        ];
        for arg in &request.args {
            command.push("--arg".to_string());
            command.push(arg.clone());
        }
        for (key, value) in &request.env {
            command.push("--env".to_string());
            command.push(format!("{}={}", key, value));
        }
        if let Some(ref version) = request.version {
            command.push("--version".to_string());
            command.push(version.clone());
        }
        command
    }

    /// Upsert the install record for a tenant's tool
    fn record_install(
        &self,
        organization_id: &str,
        request: &McpInstallRequest,
        installed_at: i64,
        install_failed: bool,
    ) {
        let record = McpRecord {
            name: request.name.clone(),
            version: request.version.clone(),
            installed_at,
            install_failed,
        };

        let mut entry = self
            .installed
            .entry(organization_id.to_string())
            .or_default();
        if let Some(existing) = entry.iter_mut().find(|r| r.name == record.name) {
            *existing = record;
        } else {
            entry.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{async_trait, RuntimeError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scriptable runtime for lifecycle tests
    struct MockRuntime {
        exists: AtomicBool,
        running: AtomicBool,
        fail_all: AtomicBool,
        fail_exec: AtomicBool,
        create_calls: AtomicUsize,
        start_calls: AtomicUsize,
        exec_calls: AtomicUsize,
    }

    impl MockRuntime {
        fn new() -> Self {
            Self {
                exists: AtomicBool::new(false),
                running: AtomicBool::new(false),
                fail_all: AtomicBool::new(false),
                fail_exec: AtomicBool::new(false),
                create_calls: AtomicUsize::new(0),
                start_calls: AtomicUsize::new(0),
                exec_calls: AtomicUsize::new(0),
            }
        }

        fn fail(&self) -> RuntimeError {
            RuntimeError::CommandFailed {
                command: "mock".to_string(),
                message: "injected failure".to_string(),
            }
        }
    }

    #[async_trait]
    impl ContainerRuntime for MockRuntime {
        async fn container_exists(&self, _name: &str) -> Result<bool, RuntimeError> {
            if self.fail_all.load(Ordering::SeqCst) {
                return Err(self.fail());
            }
            Ok(self.exists.load(Ordering::SeqCst))
        }

        async fn container_running(&self, _name: &str) -> Result<bool, RuntimeError> {
            if self.fail_all.load(Ordering::SeqCst) {
                return Err(self.fail());
            }
            Ok(self.running.load(Ordering::SeqCst))
        }

        async fn create_container(
            &self,
            _name: &str,
            _config: &McpContainerConfig,
        ) -> Result<String, RuntimeError> {
            if self.fail_all.load(Ordering::SeqCst) {
                return Err(self.fail());
            }
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.exists.store(true, Ordering::SeqCst);
            self.running.store(true, Ordering::SeqCst);
            Ok("mock-container-id".to_string())
        }

        async fn start_container(&self, _name: &str) -> Result<(), RuntimeError> {
            if self.fail_all.load(Ordering::SeqCst) {
                return Err(self.fail());
            }
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            self.running.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop_container(&self, _name: &str) -> Result<(), RuntimeError> {
            if self.fail_all.load(Ordering::SeqCst) {
                return Err(self.fail());
            }
            self.running.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn exec_in_container(
            &self,
            _name: &str,
            _command: &[String],
        ) -> Result<String, RuntimeError> {
            self.exec_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_exec.load(Ordering::SeqCst) {
                return Err(self.fail());
            }
            Ok(String::new())
        }
    }

    fn install_request(org: &str, name: &str) -> McpInstallRequest {
        McpInstallRequest {
            organization_id: org.to_string(),
            name: name.to_string(),
            command: "npx".to_string(),
            args: vec!["-y".to_string(), format!("@mcp/{}", name)],
            env: HashMap::new(),
            version: None,
        }
    }

    #[tokio::test]
    async fn test_read_queries_absorb_runtime_errors() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.fail_all.store(true, Ordering::SeqCst);
        let manager = ContainerLifecycleManager::new(runtime);

        assert!(!manager.container_exists("acme").await);
        assert!(!manager.is_container_running("acme").await);
        assert!(manager.mcp_status("acme").await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tenant_has_no_mcps() {
        let runtime = Arc::new(MockRuntime::new());
        let manager = ContainerLifecycleManager::new(runtime);
        assert!(manager.mcp_status("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_install_creates_missing_container() {
        let runtime = Arc::new(MockRuntime::new());
        let manager = ContainerLifecycleManager::new(runtime.clone());

        let status = manager
            .install_mcp(&install_request("acme", "github"))
            .await
            .unwrap();

        assert_eq!(runtime.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.exec_calls.load(Ordering::SeqCst), 1);
        assert_eq!(status.name, "github");
        assert_eq!(status.state, McpState::Running);

        let mcps = manager.mcp_status("acme").await;
        assert_eq!(mcps.len(), 1);
        assert_eq!(mcps[0].state, McpState::Running);
    }

    #[tokio::test]
    async fn test_install_starts_stopped_container() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.exists.store(true, Ordering::SeqCst);
        let manager = ContainerLifecycleManager::new(runtime.clone());

        manager
            .install_mcp(&install_request("acme", "github"))
            .await
            .unwrap();

        assert_eq!(runtime.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(runtime.start_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_install_recorded_in_error_state() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.fail_exec.store(true, Ordering::SeqCst);
        let manager = ContainerLifecycleManager::new(runtime);

        let result = manager.install_mcp(&install_request("acme", "github")).await;
        assert!(result.is_err());

        let mcps = manager.mcp_status("acme").await;
        assert_eq!(mcps.len(), 1);
        assert_eq!(mcps[0].state, McpState::Error);
    }

    #[tokio::test]
    async fn test_reinstall_replaces_record() {
        let runtime = Arc::new(MockRuntime::new());
        let manager = ContainerLifecycleManager::new(runtime);

        let mut request = install_request("acme", "github");
        manager.install_mcp(&request).await.unwrap();
        request.version = Some("2.0.0".to_string());
        manager.install_mcp(&request).await.unwrap();

        let mcps = manager.mcp_status("acme").await;
        assert_eq!(mcps.len(), 1);
        assert_eq!(mcps[0].version, Some("2.0.0".to_string()));
    }

    #[tokio::test]
    async fn test_stopped_container_reports_tools_stopped() {
        let runtime = Arc::new(MockRuntime::new());
        let manager = ContainerLifecycleManager::new(runtime.clone());

        manager
            .install_mcp(&install_request("acme", "github"))
            .await
            .unwrap();
        manager.stop_container("acme").await.unwrap();

        let mcps = manager.mcp_status("acme").await;
        assert_eq!(mcps[0].state, McpState::Stopped);
    }

    #[tokio::test]
    async fn test_create_reflects_in_exists_and_running() {
        let runtime = Arc::new(MockRuntime::new());
        let manager = ContainerLifecycleManager::new(runtime);

        assert!(!manager.container_exists("acme").await);
        let info = manager
            .create_container("acme", &McpContainerConfig::default())
            .await
            .unwrap();

        assert_eq!(info.container_name, "teamhub-mcp-acme");
        assert_eq!(info.status, ContainerStatus::Running);
        assert!(manager.container_exists("acme").await);
        assert!(manager.is_container_running("acme").await);
    }
}
