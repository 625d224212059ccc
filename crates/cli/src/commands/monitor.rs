//! Background monitor control commands

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, MonitoringStatus};
use crate::output::{print_success, OutputFormat};

/// Show whether the background resource monitor is running
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status: MonitoringStatus = client.get("api/v1/monitoring").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table => {
            let state = if status.running {
                "running".green().to_string()
            } else {
                "stopped".yellow().to_string()
            };
            println!("Monitoring: {}", state);
        }
    }

    Ok(())
}

/// Start the background resource monitor
pub async fn start(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status: MonitoringStatus = client.post_empty("api/v1/monitoring/start").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table => {
            print_success("Resource monitoring started");
        }
    }

    Ok(())
}

/// Stop the background resource monitor
pub async fn stop(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status: MonitoringStatus = client.post_empty("api/v1/monitoring/stop").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table => {
            print_success("Resource monitoring stopped");
        }
    }

    Ok(())
}
