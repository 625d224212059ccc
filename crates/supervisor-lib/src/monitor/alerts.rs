//! Threshold-based alert evaluation
//!
//! Pure evaluation of one usage reading against a tenant's limits. Thresholds
//! are configuration constants, checked critical-first so each metric yields
//! at most one alert per evaluation.

use chrono::Utc;

use crate::models::{
    AlertKind, AlertSeverity, ResourceAlert, ResourceLimits, ResourceUsage,
};

/// Warning threshold for memory and CPU utilization
const UTILIZATION_WARNING_PERCENT: f64 = 75.0;
/// Critical threshold for memory and CPU utilization
const UTILIZATION_CRITICAL_PERCENT: f64 = 90.0;
/// Fraction of the MCP tool capacity that triggers a warning
const MCP_WARNING_RATIO: f64 = 0.8;
/// Process count above which a warning is raised
const PIDS_WARNING_THRESHOLD: u32 = 100;

/// Evaluate one usage reading against limits, in order: memory, cpu, mcps, pids
pub fn evaluate_alerts(
    usage: &ResourceUsage,
    limits: &ResourceLimits,
    mcp_count: usize,
) -> Vec<ResourceAlert> {
    let mut alerts = Vec::new();
    let organization_id = &usage.organization_id;
    let timestamp = Utc::now().timestamp();

    if let Some(severity) = utilization_severity(usage.memory_percent) {
        alerts.push(ResourceAlert {
            organization_id: organization_id.clone(),
            kind: AlertKind::Memory,
            severity,
            message: format!(
                "Memory usage at {:.1}% ({} of {})",
                usage.memory_percent, usage.memory_usage, limits.memory_limit
            ),
            current_value: usage.memory_percent,
            limit_value: threshold_for(severity),
            timestamp,
        });
    }

    if let Some(severity) = utilization_severity(usage.cpu_percent) {
        alerts.push(ResourceAlert {
            organization_id: organization_id.clone(),
            kind: AlertKind::Cpu,
            severity,
            message: format!(
                "CPU usage at {:.1}% of a {} core allocation",
                usage.cpu_percent, limits.cpu_limit
            ),
            current_value: usage.cpu_percent,
            limit_value: threshold_for(severity),
            timestamp,
        });
    }

    if let Some(severity) = mcp_capacity_severity(mcp_count, limits.max_mcps) {
        alerts.push(ResourceAlert {
            organization_id: organization_id.clone(),
            kind: AlertKind::Mcps,
            severity,
            message: format!(
                "{} of {} MCP tool slots in use",
                mcp_count, limits.max_mcps
            ),
            current_value: mcp_count as f64,
            limit_value: limits.max_mcps as f64,
            timestamp,
        });
    }

    // AlertKind has no pids variant; process pressure reports under cpu
    if usage.pids > PIDS_WARNING_THRESHOLD {
        alerts.push(ResourceAlert {
            organization_id: organization_id.clone(),
            kind: AlertKind::Cpu,
            severity: AlertSeverity::Warning,
            message: format!(
                "{} processes running (threshold {})",
                usage.pids, PIDS_WARNING_THRESHOLD
            ),
            current_value: usage.pids as f64,
            limit_value: PIDS_WARNING_THRESHOLD as f64,
            timestamp,
        });
    }

    alerts
}

/// Severity for a utilization percentage, critical checked first
fn utilization_severity(percent: f64) -> Option<AlertSeverity> {
    if percent > UTILIZATION_CRITICAL_PERCENT {
        Some(AlertSeverity::Critical)
    } else if percent > UTILIZATION_WARNING_PERCENT {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

/// Severity for installed-tool count against the tenant's capacity
fn mcp_capacity_severity(mcp_count: usize, max_mcps: u32) -> Option<AlertSeverity> {
    let count = mcp_count as f64;
    let max = max_mcps as f64;
    if count >= max {
        Some(AlertSeverity::Critical)
    } else if count >= max * MCP_WARNING_RATIO {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

fn threshold_for(severity: AlertSeverity) -> f64 {
    match severity {
        AlertSeverity::Warning => UTILIZATION_WARNING_PERCENT,
        AlertSeverity::Critical => UTILIZATION_CRITICAL_PERCENT,
    }
}
