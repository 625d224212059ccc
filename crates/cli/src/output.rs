//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Color a container status based on value
pub fn color_status(status: &str) -> String {
    match status {
        "running" => status.green().to_string(),
        "stopped" => status.yellow().to_string(),
        "not_found" | "error" | "failed" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color an alert severity based on value
pub fn color_severity(severity: &str) -> String {
    match severity {
        "critical" => severity.red().bold().to_string(),
        "warning" => severity.yellow().to_string(),
        _ => severity.to_string(),
    }
}

/// Format a utilization percentage, colored by how close it is to the cap
pub fn format_percent(percent: f64) -> String {
    let formatted = format!("{:.1}%", percent);
    if percent > 90.0 {
        formatted.red().to_string()
    } else if percent > 75.0 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

/// Format a unix timestamp for display
pub fn format_timestamp(timestamp: i64) -> String {
    match chrono::DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}
