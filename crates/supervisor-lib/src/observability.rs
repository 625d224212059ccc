//! Observability infrastructure for the supervisor
//!
//! Provides:
//! - Prometheus metrics (poll cycle latency, fleet gauges, alert/error counters)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_gauge, register_int_gauge_vec, Histogram, IntGauge,
    IntGaugeVec,
};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{AlertSeverity, ResourceAlert};

/// Histogram buckets for poll cycle duration (in seconds)
const CYCLE_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Histogram buckets for single runtime stats queries (in seconds)
const QUERY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SupervisorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct SupervisorMetricsInner {
    poll_cycle_seconds: Histogram,
    stats_query_seconds: Histogram,
    organizations_monitored: IntGauge,
    containers_running: IntGauge,
    alerts_emitted: IntGaugeVec,
    runtime_errors: IntGauge,
    parse_failures: IntGauge,
    mcp_installs: IntGaugeVec,
}

impl SupervisorMetricsInner {
    fn new() -> Self {
        Self {
            poll_cycle_seconds: register_histogram!(
                "mcp_supervisor_poll_cycle_seconds",
                "Time spent assembling summaries for the whole fleet",
                CYCLE_BUCKETS.to_vec()
            )
            .expect("Failed to register poll_cycle_seconds"),

            stats_query_seconds: register_histogram!(
                "mcp_supervisor_stats_query_seconds",
                "Time spent on a single container runtime stats query",
                QUERY_BUCKETS.to_vec()
            )
            .expect("Failed to register stats_query_seconds"),

            organizations_monitored: register_int_gauge!(
                "mcp_supervisor_organizations_monitored",
                "Number of tenant organizations seen in the last poll cycle"
            )
            .expect("Failed to register organizations_monitored"),

            containers_running: register_int_gauge!(
                "mcp_supervisor_containers_running",
                "Number of tenant containers running in the last poll cycle"
            )
            .expect("Failed to register containers_running"),

            alerts_emitted: register_int_gauge_vec!(
                "mcp_supervisor_alerts_emitted_total",
                "Total number of resource alerts emitted, by severity",
                &["severity"]
            )
            .expect("Failed to register alerts_emitted"),

            runtime_errors: register_int_gauge!(
                "mcp_supervisor_runtime_errors_total",
                "Total number of container runtime query failures"
            )
            .expect("Failed to register runtime_errors"),

            parse_failures: register_int_gauge!(
                "mcp_supervisor_parse_failures_total",
                "Total number of stats rows dropped by the parser"
            )
            .expect("Failed to register parse_failures"),

            mcp_installs: register_int_gauge_vec!(
                "mcp_supervisor_mcp_installs_total",
                "Total number of MCP tool install attempts, by result",
                &["result"]
            )
            .expect("Failed to register mcp_installs"),
        }
    }
}

/// Supervisor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SupervisorMetrics {
    // This is just a marker - we use the global instance
    _private: (),
}

impl Default for SupervisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SupervisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SupervisorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record one completed poll cycle
    pub fn observe_poll_cycle(&self, organizations: usize, running: usize, elapsed: Duration) {
        let inner = self.inner();
        inner.poll_cycle_seconds.observe(elapsed.as_secs_f64());
        inner.organizations_monitored.set(organizations as i64);
        inner.containers_running.set(running as i64);
    }

    /// Record the latency of one runtime stats query
    pub fn observe_stats_query(&self, elapsed: Duration) {
        self.inner().stats_query_seconds.observe(elapsed.as_secs_f64());
    }

    /// Count an emitted alert by severity
    pub fn inc_alerts_emitted(&self, severity: AlertSeverity) {
        self.inner()
            .alerts_emitted
            .with_label_values(&[&severity.to_string()])
            .inc();
    }

    /// Count a runtime query failure
    pub fn inc_runtime_errors(&self) {
        self.inner().runtime_errors.inc();
    }

    /// Count a stats row the parser dropped
    pub fn inc_parse_failures(&self) {
        self.inner().parse_failures.inc();
    }

    /// Count an MCP install attempt
    pub fn inc_mcp_installs(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.inner()
            .mcp_installs
            .with_label_values(&[result])
            .inc();
    }
}

/// Structured logger for supervisor events
///
/// Provides consistent JSON-formatted logging for lifecycle transitions
/// and alert emission.
#[derive(Clone, Default)]
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn new() -> Self {
        Self
    }

    /// Log supervisor startup
    pub fn log_startup(&self, version: &str, runtime_version: &str) {
        info!(
            event = "supervisor_started",
            supervisor_version = %version,
            runtime_version = %runtime_version,
            "MCP supervisor started"
        );
    }

    /// Log supervisor shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "supervisor_shutdown",
            reason = %reason,
            "MCP supervisor shutting down"
        );
    }

    /// Log one resource alert; critical alerts log at warn level
    pub fn log_alert(&self, alert: &ResourceAlert) {
        match alert.severity {
            AlertSeverity::Critical => {
                warn!(
                    event = "resource_alert",
                    organization_id = %alert.organization_id,
                    kind = %alert.kind,
                    severity = %alert.severity,
                    current_value = alert.current_value,
                    limit_value = alert.limit_value,
                    message = %alert.message,
                    "Critical resource alert"
                );
            }
            AlertSeverity::Warning => {
                info!(
                    event = "resource_alert",
                    organization_id = %alert.organization_id,
                    kind = %alert.kind,
                    severity = %alert.severity,
                    current_value = alert.current_value,
                    limit_value = alert.limit_value,
                    message = %alert.message,
                    "Resource alert"
                );
            }
        }
    }

    /// Log one completed poll cycle
    pub fn log_poll_cycle(&self, organizations: usize, critical_alerts: usize, elapsed_ms: u64) {
        info!(
            event = "poll_cycle",
            organizations = organizations,
            critical_alerts = critical_alerts,
            elapsed_ms = elapsed_ms,
            "Fleet poll cycle complete"
        );
    }
}
