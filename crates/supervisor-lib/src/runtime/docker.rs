//! Docker CLI backed runtime client
//!
//! Shells out to the `docker` binary for every query and lifecycle operation.
//! Each spawned command runs under a timeout so a hung daemon degrades one
//! query instead of stalling a polling cycle.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use super::{async_trait, ContainerRuntime, RuntimeError, RuntimeStats};
use crate::models::McpContainerConfig;

/// Stats table format: 8 comma-delimited positional fields after the header
const STATS_FORMAT: &str =
    "table {{.ID}},{{.Name}},{{.CPUPerc}},{{.MemUsage}},{{.MemPerc}},{{.NetIO}},{{.BlockIO}},{{.PIDs}}";

/// Configuration for the Docker CLI client
#[derive(Debug, Clone)]
pub struct DockerCliConfig {
    /// Path to the docker binary
    pub binary: PathBuf,
    /// Timeout applied to every spawned command
    pub query_timeout: Duration,
}

impl Default for DockerCliConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("docker"),
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// Container runtime client backed by the docker CLI
pub struct DockerCli {
    config: DockerCliConfig,
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_config(DockerCliConfig::default())
    }

    pub fn with_config(config: DockerCliConfig) -> Self {
        Self { config }
    }

    /// Check the binary responds at all; returns its version string
    pub async fn verify_binary(&self) -> Result<String, RuntimeError> {
        let cmd_str = format!("{} --version", self.config.binary.display());
        let output = tokio::time::timeout(
            self.config.query_timeout,
            Command::new(&self.config.binary)
                .arg("--version")
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .map_err(|_| RuntimeError::Timeout {
            command: cmd_str,
            timeout_secs: self.config.query_timeout.as_secs(),
        })?
        .map_err(|e| RuntimeError::BinaryNotFound(format!("{:?}: {}", self.config.binary, e)))?;

        if !output.status.success() {
            return Err(RuntimeError::BinaryNotFound(format!(
                "{:?} returned non-zero exit code",
                self.config.binary
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(version = %version, "container runtime binary verified");
        Ok(version)
    }

    /// Spawn a docker command with the configured timeout
    async fn exec(&self, args: &[&str]) -> Result<std::process::Output, RuntimeError> {
        let cmd_str = format!("docker {}", args.join(" "));
        debug!(command = %cmd_str, "executing runtime command");

        tokio::time::timeout(
            self.config.query_timeout,
            Command::new(&self.config.binary)
                .args(args)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .map_err(|_| RuntimeError::Timeout {
            command: cmd_str,
            timeout_secs: self.config.query_timeout.as_secs(),
        })?
        .map_err(RuntimeError::Io)
    }

    /// Run a command, requiring a zero exit status; returns stdout
    async fn exec_checked(&self, args: &[&str]) -> Result<String, RuntimeError> {
        let output = self.exec(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::CommandFailed {
                command: args.first().copied().unwrap_or("docker").to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Non-empty output lines from a listing-style command
    async fn exec_lines(&self, args: &[&str]) -> Result<Vec<String>, RuntimeError> {
        let stdout = self.exec_checked(args).await?;
        Ok(stdout
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    /// `docker inspect` the running flag; "No such object" maps to None
    async fn inspect_running(&self, name: &str) -> Result<Option<bool>, RuntimeError> {
        let output = self
            .exec(&["inspect", "--format", "{{.State.Running}}", name])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No such object") || stderr.contains("No such container") {
                return Ok(None);
            }
            return Err(RuntimeError::CommandFailed {
                command: "inspect".to_string(),
                message: stderr.trim().to_string(),
            });
        }

        let state = String::from_utf8_lossy(&output.stdout);
        Ok(Some(state.trim() == "true"))
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeStats for DockerCli {
    async fn stats_by_name(&self, container_name: &str) -> Result<String, RuntimeError> {
        self.exec_checked(&[
            "stats",
            "--no-stream",
            "--format",
            STATS_FORMAT,
            container_name,
        ])
        .await
    }

    async fn stats_by_filter(&self, name_filter: &str) -> Result<String, RuntimeError> {
        // `docker stats` takes names, not filters; resolve the filter first.
        let filter = format!("name={}", name_filter);
        let names = self
            .exec_lines(&["ps", "--filter", &filter, "--format", "{{.Names}}"])
            .await?;

        if names.is_empty() {
            return Ok(String::new());
        }

        let mut args = vec!["stats", "--no-stream", "--format", STATS_FORMAT];
        args.extend(names.iter().map(|n| n.as_str()));
        self.exec_checked(&args).await
    }

    async fn list_by_filter(&self, name_filter: &str) -> Result<Vec<String>, RuntimeError> {
        let filter = format!("name={}", name_filter);
        self.exec_lines(&["ps", "-a", "--filter", &filter, "--format", "{{.Names}}"])
            .await
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn container_exists(&self, container_name: &str) -> Result<bool, RuntimeError> {
        Ok(self.inspect_running(container_name).await?.is_some())
    }

    async fn container_running(&self, container_name: &str) -> Result<bool, RuntimeError> {
        Ok(self
            .inspect_running(container_name)
            .await?
            .unwrap_or(false))
    }

    async fn create_container(
        &self,
        container_name: &str,
        config: &McpContainerConfig,
    ) -> Result<String, RuntimeError> {
        let cpus = format!("{}", config.cpu_limit);
        let mut args: Vec<String> = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            "--memory".to_string(),
            config.memory_limit.clone(),
            "--cpus".to_string(),
            cpus,
            "--restart".to_string(),
            "unless-stopped".to_string(),
        ];
        for (key, value) in &config.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(config.image.clone());

        let arg_refs: Vec<&str> = args.iter().map(|a| a.as_str()).collect();
        let stdout = self.exec_checked(&arg_refs).await?;
        let container_id = stdout.trim().to_string();
        debug!(container = %container_name, id = %container_id, "container created");
        Ok(container_id)
    }

    async fn start_container(&self, container_name: &str) -> Result<(), RuntimeError> {
        self.exec_checked(&["start", container_name]).await?;
        debug!(container = %container_name, "container started");
        Ok(())
    }

    async fn stop_container(&self, container_name: &str) -> Result<(), RuntimeError> {
        self.exec_checked(&["stop", container_name]).await?;
        debug!(container = %container_name, "container stopped");
        Ok(())
    }

    async fn exec_in_container(
        &self,
        container_name: &str,
        command: &[String],
    ) -> Result<String, RuntimeError> {
        let mut args = vec!["exec", container_name];
        args.extend(command.iter().map(|c| c.as_str()));
        self.exec_checked(&args).await
    }
}
