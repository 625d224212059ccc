//! Resource monitoring for tenant containers
//!
//! The monitor answers point-in-time questions: what is this tenant's
//! container consuming, which limits apply, and is anything over threshold.
//! It reads the container runtime through the narrow [`RuntimeStats`] surface
//! and consults the lifecycle manager for container state and tool counts.
//!
//! Every query degrades instead of failing: a runtime error or unparseable
//! stats row yields an absent reading, and a summary is always produced even
//! when every underlying call fails.

mod alerts;
mod r#loop;


pub use alerts::evaluate_alerts;
pub use r#loop::{MonitorLoop, PollerConfig};

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use crate::lifecycle::ContainerLifecycleManager;
use crate::models::{
    ContainerStatus, LimitOverrides, OrganizationSummary, ResourceLimits, ResourceUsage,
};
use crate::naming;
use crate::observability::SupervisorMetrics;
use crate::runtime::{parse_stats_line, RuntimeError, RuntimeStats};

/// Point-in-time resource queries over the tenant fleet
pub struct ResourceMonitor {
    stats: Arc<dyn RuntimeStats>,
    lifecycle: Arc<ContainerLifecycleManager>,
    metrics: SupervisorMetrics,
}

impl ResourceMonitor {
    pub fn new(stats: Arc<dyn RuntimeStats>, lifecycle: Arc<ContainerLifecycleManager>) -> Self {
        Self {
            stats,
            lifecycle,
            metrics: SupervisorMetrics::new(),
        }
    }

    /// Current resource usage for one tenant's container
    ///
    /// `None` when the container is not running, the runtime query fails, or
    /// the stats row cannot be parsed.
    pub async fn resource_usage(&self, organization_id: &str) -> Option<ResourceUsage> {
        let name = naming::container_name(organization_id);

        let started = Instant::now();
        let result = self.stats.stats_by_name(&name).await;
        self.metrics.observe_stats_query(started.elapsed());

        let output = match result {
            Ok(output) => output,
            Err(RuntimeError::CommandFailed { message, .. })
                if message.contains("No such container") =>
            {
                debug!(
                    organization_id = %organization_id,
                    "no stats: container not running"
                );
                return None;
            }
            Err(e) => {
                warn!(
                    organization_id = %organization_id,
                    error = %e,
                    "stats query failed"
                );
                self.metrics.inc_runtime_errors();
                return None;
            }
        };

        // First line is the table header
        let line = output.lines().nth(1)?;
        match parse_stats_line(line) {
            Some(usage) => Some(usage),
            None => {
                self.metrics.inc_parse_failures();
                None
            }
        }
    }

    /// Resource usage for every running tenant container
    ///
    /// Rows that fail to parse and containers outside the tenant namespace
    /// are dropped. A failed runtime query yields an empty list.
    pub async fn all_resource_usage(&self) -> Vec<ResourceUsage> {
        let started = Instant::now();
        let result = self.stats.stats_by_filter(naming::CONTAINER_PREFIX).await;
        self.metrics.observe_stats_query(started.elapsed());

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "fleet stats query failed");
                self.metrics.inc_runtime_errors();
                return Vec::new();
            }
        };

        let mut readings = Vec::new();
        for line in output.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_stats_line(line) {
                Some(usage) if naming::is_tenant_container(&usage.container_name) => {
                    readings.push(usage);
                }
                Some(usage) => {
                    debug!(
                        container = %usage.container_name,
                        "skipping non-tenant container in stats output"
                    );
                }
                None => self.metrics.inc_parse_failures(),
            }
        }
        readings
    }

    /// Effective limits for a tenant: process defaults merged with overrides
    pub fn resource_limits(
        &self,
        organization_id: &str,
        overrides: Option<&LimitOverrides>,
    ) -> ResourceLimits {
        let limits = ResourceLimits::defaults_for(organization_id);
        match overrides {
            Some(overrides) => limits.merged_with(overrides),
            None => limits,
        }
    }

    /// Full point-in-time summary for one tenant
    ///
    /// Caller-supplied limit overrides feed both the reported limits and
    /// alert evaluation. Always returns a summary. When the container is
    /// absent or every underlying query fails, the result carries `NotFound`,
    /// no usage, no alerts, and the resolved limits.
    pub async fn organization_summary(
        &self,
        organization_id: &str,
        overrides: Option<&LimitOverrides>,
    ) -> OrganizationSummary {
        let limits = self.resource_limits(organization_id, overrides);

        let exists = self.lifecycle.container_exists(organization_id).await;
        let running = if exists {
            self.lifecycle.is_container_running(organization_id).await
        } else {
            false
        };

        let container_status = if !exists {
            ContainerStatus::NotFound
        } else if running {
            ContainerStatus::Running
        } else {
            ContainerStatus::Stopped
        };

        let (resource_usage, mcp_count) = if running {
            (
                self.resource_usage(organization_id).await,
                self.lifecycle.mcp_status(organization_id).await.len(),
            )
        } else {
            (None, 0)
        };

        let alerts = match resource_usage {
            Some(ref usage) => evaluate_alerts(usage, &limits, mcp_count),
            None => Vec::new(),
        };

        OrganizationSummary {
            organization_id: organization_id.to_string(),
            container_status,
            resource_usage,
            limits,
            mcp_count,
            alerts,
            last_updated: Utc::now().timestamp(),
        }
    }

    /// Summaries for every tenant with a container, running or stopped
    ///
    /// Tenants are discovered by listing containers in the tenant namespace;
    /// a failed listing yields an empty list. Summaries are assembled one at
    /// a time so a slow tenant delays but never sinks the sweep.
    pub async fn all_organization_summaries(&self) -> Vec<OrganizationSummary> {
        let names = match self.stats.list_by_filter(naming::CONTAINER_PREFIX).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "container listing failed");
                self.metrics.inc_runtime_errors();
                return Vec::new();
            }
        };

        let mut summaries = Vec::new();
        for name in names {
            match naming::organization_id(&name) {
                Some(organization_id) => {
                    summaries.push(self.organization_summary(&organization_id, None).await);
                }
                None => {
                    debug!(container = %name, "skipping non-tenant container");
                }
            }
        }
        summaries
    }
}
