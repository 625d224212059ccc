//! MCP tool management commands

use std::collections::HashMap;

use anyhow::{Context, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::client::{ApiClient, InstallMcpRequest, McpStatus};
use crate::output::{color_status, format_timestamp, print_success, print_warning, OutputFormat};

#[derive(Tabled)]
struct McpRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

/// List installed MCP tools for an organization
pub async fn list_mcps(client: &ApiClient, organization: &str, format: OutputFormat) -> Result<()> {
    let mcps: Vec<McpStatus> = client
        .get(&format!("api/v1/organizations/{}/mcps", organization))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&mcps)?);
        }
        OutputFormat::Table => {
            if mcps.is_empty() {
                print_warning(&format!("No MCP tools installed for {}", organization));
                return Ok(());
            }

            let rows: Vec<McpRow> = mcps
                .iter()
                .map(|mcp| McpRow {
                    name: mcp.name.clone(),
                    state: color_status(&mcp.state),
                    version: mcp.version.clone().unwrap_or_else(|| "-".to_string()),
                    installed: format_timestamp(mcp.installed_at),
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

/// Fields collected from the install subcommand
pub struct InstallOptions {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env_pairs: Vec<String>,
    pub version: Option<String>,
}

/// Install an MCP tool into an organization's container
pub async fn install_mcp(
    client: &ApiClient,
    organization: &str,
    options: InstallOptions,
    format: OutputFormat,
) -> Result<()> {
    let env = parse_env_pairs(&options.env_pairs)?;

    let request = InstallMcpRequest {
        name: options.name,
        command: options.command,
        args: options.args,
        env,
        version: options.version,
    };

    let status: McpStatus = client
        .post(
            &format!("api/v1/organizations/{}/mcps", organization),
            &request,
        )
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table => {
            print_success(&format!(
                "MCP tool {} installed for {}",
                status.name, organization
            ));
            println!("State: {}", color_status(&status.state));
        }
    }

    Ok(())
}

fn parse_env_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .with_context(|| format!("Invalid --env value '{}', expected KEY=VALUE", pair))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_pairs() {
        let pairs = vec![
            "GITHUB_TOKEN=abc123".to_string(),
            "LOG_LEVEL=debug".to_string(),
        ];
        let env = parse_env_pairs(&pairs).unwrap();
        assert_eq!(env.get("GITHUB_TOKEN").map(String::as_str), Some("abc123"));
        assert_eq!(env.get("LOG_LEVEL").map(String::as_str), Some("debug"));
    }

    #[test]
    fn test_parse_env_pairs_rejects_missing_separator() {
        let pairs = vec!["NOT_A_PAIR".to_string()];
        assert!(parse_env_pairs(&pairs).is_err());
    }
}
