//! Tenant summary commands

use anyhow::Result;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::client::{ApiClient, OrganizationSummary, ResourceUsage, UsageResponse};
use crate::output::{
    color_severity, color_status, format_percent, format_timestamp, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Organization")]
    organization: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "MCPs")]
    mcps: String,
    #[tabled(rename = "Alerts")]
    alerts: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn summary_row(summary: &OrganizationSummary) -> SummaryRow {
    let (cpu, memory) = match &summary.resource_usage {
        Some(usage) => (
            format_percent(usage.cpu_percent),
            format!("{} / {}", usage.memory_usage, usage.memory_limit),
        ),
        None => ("-".to_string(), "-".to_string()),
    };

    let critical = summary
        .alerts
        .iter()
        .filter(|a| a.severity == "critical")
        .count();
    let alerts = if summary.alerts.is_empty() {
        "0".to_string()
    } else if critical > 0 {
        format!("{} ({} critical)", summary.alerts.len(), critical)
            .red()
            .to_string()
    } else {
        summary.alerts.len().to_string().yellow().to_string()
    };

    SummaryRow {
        organization: summary.organization_id.clone(),
        status: color_status(&summary.container_status),
        cpu,
        memory,
        mcps: format!("{}/{}", summary.mcp_count, summary.limits.max_mcps),
        alerts,
        updated: format_timestamp(summary.last_updated),
    }
}

/// Show summaries for every tenant container
pub async fn show_fleet(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let summaries: Vec<OrganizationSummary> = client.get("api/v1/summaries").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Table => {
            if summaries.is_empty() {
                print_warning("No tenant containers found");
                return Ok(());
            }

            let rows: Vec<SummaryRow> = summaries.iter().map(summary_row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!("\nTotal: {} organizations", summaries.len());
        }
    }

    Ok(())
}

/// Show the summary for one organization
pub async fn show_summary(client: &ApiClient, organization: &str, format: OutputFormat) -> Result<()> {
    let summary: OrganizationSummary = client
        .get(&format!("api/v1/organizations/{}/summary", organization))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            println!("Organization:  {}", summary.organization_id);
            println!("Status:        {}", color_status(&summary.container_status));
            println!(
                "MCP tools:     {}/{}",
                summary.mcp_count, summary.limits.max_mcps
            );
            println!(
                "Limits:        memory {}, cpu {}, storage {}, network {}MB",
                summary.limits.memory_limit,
                summary.limits.cpu_limit,
                summary.limits.storage_limit,
                summary.limits.network_limit_mb
            );

            if let Some(usage) = &summary.resource_usage {
                print_usage_block(usage);
            }

            if summary.alerts.is_empty() {
                println!("Alerts:        none");
            } else {
                println!("Alerts:");
                for alert in &summary.alerts {
                    println!(
                        "  {:<10} {:<8} {}",
                        color_severity(&alert.severity),
                        alert.kind,
                        alert.message
                    );
                }
            }

            println!("Last updated:  {}", format_timestamp(summary.last_updated));
        }
    }

    Ok(())
}

/// Show current resource usage for one organization
pub async fn show_usage(client: &ApiClient, organization: &str, format: OutputFormat) -> Result<()> {
    let response: UsageResponse = client
        .get(&format!("api/v1/organizations/{}/usage", organization))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => match &response.usage {
            Some(usage) => {
                println!("Organization:  {}", usage.organization_id);
                println!("Container:     {}", usage.container_name);
                print_usage_block(usage);
                println!("Sampled at:    {}", format_timestamp(usage.timestamp));
            }
            None => {
                print_warning(&format!(
                    "No resource usage for {}; the container is not running",
                    organization
                ));
            }
        },
    }

    Ok(())
}

fn print_usage_block(usage: &ResourceUsage) {
    println!("CPU:           {}", format_percent(usage.cpu_percent));
    println!(
        "Memory:        {} / {} ({})",
        usage.memory_usage,
        usage.memory_limit,
        format_percent(usage.memory_percent)
    );
    println!("Network I/O:   {} / {}", usage.network_in, usage.network_out);
    println!("Block I/O:     {} / {}", usage.block_in, usage.block_out);
    println!("PIDs:          {}", usage.pids);
}
