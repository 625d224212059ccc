//! Supervisor configuration

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use supervisor_lib::monitor::PollerConfig;
use supervisor_lib::runtime::DockerCliConfig;

/// Supervisor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorConfig {
    /// API server port for the admin and health endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Container runtime binary to drive
    #[serde(default = "default_docker_binary")]
    pub docker_binary: String,

    /// Fleet poll interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout for a single runtime command in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Image used when creating tenant tool-server containers
    #[serde(default = "default_mcp_image")]
    pub mcp_image: String,
}

fn default_api_port() -> u16 {
    8080
}

fn default_docker_binary() -> String {
    "docker".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_query_timeout() -> u64 {
    5
}

fn default_mcp_image() -> String {
    "teamhub/mcp-runtime:latest".to_string()
}

impl SupervisorConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SUPERVISOR"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| SupervisorConfig {
            api_port: default_api_port(),
            docker_binary: default_docker_binary(),
            poll_interval_secs: default_poll_interval(),
            query_timeout_secs: default_query_timeout(),
            mcp_image: default_mcp_image(),
        }))
    }

    pub fn docker_cli_config(&self) -> DockerCliConfig {
        DockerCliConfig {
            binary: self.docker_binary.clone().into(),
            query_timeout: Duration::from_secs(self.query_timeout_secs),
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}
