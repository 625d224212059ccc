//! API client for communicating with the supervisor's admin API

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// API client for the MCP supervisor
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub organization_id: String,
    pub container_status: String,
    pub resource_usage: Option<ResourceUsage>,
    pub limits: ResourceLimits,
    pub mcp_count: usize,
    pub alerts: Vec<ResourceAlert>,
    pub last_updated: i64,
}

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

/// Usage endpoint envelope; the reading is null while no container is running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub organization_id: String,
    pub usage: Option<ResourceUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub organization_id: String,
    pub memory_limit: String,
    pub cpu_limit: f64,
    pub max_mcps: u32,
    pub storage_limit: String,
    pub network_limit_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAlert {
    pub organization_id: String,
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub current_value: f64,
    pub limit_value: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpStatus {
    pub name: String,
    pub state: String,
    pub version: Option<String>,
    pub installed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallMcpRequest {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStatus {
    pub running: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_parses_json_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/monitoring")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"running":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let status: MonitoringStatus = client.get("api/v1/monitoring").await.unwrap();

        mock.assert_async().await;
        assert!(status.running);
    }

    #[tokio::test]
    async fn test_get_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/summaries")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"listing blew up"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result: Result<Vec<OrganizationSummary>> = client.get("api/v1/summaries").await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("listing blew up"));
    }

    #[tokio::test]
    async fn test_get_usage_envelope_with_null_reading() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/organizations/acme/usage")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"organization_id":"acme","usage":null}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let response: UsageResponse = client
            .get("api/v1/organizations/acme/usage")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.organization_id, "acme");
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/organizations/acme/mcps")
            .match_header("content-type", "application/json")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"github","state":"running","version":null,"installed_at":1700000000}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let request = InstallMcpRequest {
            name: "github".to_string(),
            command: "npx".to_string(),
            args: vec!["-y".to_string()],
            env: HashMap::new(),
            version: None,
        };
        let status: McpStatus = client
            .post("api/v1/organizations/acme/mcps", &request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(status.name, "github");
        assert_eq!(status.state, "running");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
