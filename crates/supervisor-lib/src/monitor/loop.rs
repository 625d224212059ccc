//! Background fleet polling loop
//!
//! Periodically assembles summaries for every tenant organization so that
//! threshold violations surface in logs and metrics without anyone asking.

use super::ResourceMonitor;
use crate::models::{AlertSeverity, ContainerStatus};
use crate::observability::{StructuredLogger, SupervisorMetrics};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Configuration for the background polling loop
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between fleet sweeps (default: 30 seconds)
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Handle to a running poll task
struct PollerHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// Owns the background polling task and its start/stop state
///
/// `start` and `stop` are idempotent: starting twice leaves a single task
/// running, stopping an idle loop is a no-op.
pub struct MonitorLoop {
    monitor: Arc<ResourceMonitor>,
    config: PollerConfig,
    handle: Mutex<Option<PollerHandle>>,
    logger: StructuredLogger,
    metrics: SupervisorMetrics,
}

impl MonitorLoop {
    /// Create a new polling loop around a monitor
    pub fn new(monitor: Arc<ResourceMonitor>, config: PollerConfig) -> Self {
        Self {
            monitor,
            config,
            handle: Mutex::new(None),
            logger: StructuredLogger::new(),
            metrics: SupervisorMetrics::new(),
        }
    }

    /// Start the background poll task if it is not already running
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;

        if handle.is_some() {
            info!("Resource monitoring already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(run_poll_loop(
            self.monitor.clone(),
            self.config.interval,
            self.logger.clone(),
            self.metrics.clone(),
            shutdown_rx,
        ));

        *handle = Some(PollerHandle { shutdown_tx, task });

        info!(
            interval_secs = self.config.interval.as_secs(),
            "Started resource monitoring"
        );
    }

    /// Stop the background poll task and wait for it to exit
    pub async fn stop(&self) {
        let taken = self.handle.lock().await.take();

        match taken {
            Some(PollerHandle { shutdown_tx, task }) => {
                let _ = shutdown_tx.send(());
                let _ = task.await;
                info!("Stopped resource monitoring");
            }
            None => {
                info!("Resource monitoring already stopped");
            }
        }
    }

    /// Whether the poll task is currently scheduled
    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}

/// The poll task itself: sweep, log, record, sleep
async fn run_poll_loop(
    monitor: Arc<ResourceMonitor>,
    poll_interval: Duration,
    logger: StructuredLogger,
    metrics: SupervisorMetrics,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(poll_interval);
    // A slow sweep pushes the next tick out instead of bursting to catch up
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycle_count = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let start = Instant::now();

                let summaries = monitor.all_organization_summaries().await;

                let elapsed = start.elapsed();
                cycle_count += 1;

                let running = summaries
                    .iter()
                    .filter(|s| s.container_status == ContainerStatus::Running)
                    .count();

                let mut critical_alerts = 0usize;
                for summary in &summaries {
                    for alert in &summary.alerts {
                        metrics.inc_alerts_emitted(alert.severity);
                        if alert.severity == AlertSeverity::Critical {
                            critical_alerts += 1;
                        }
                        logger.log_alert(alert);
                    }
                }

                metrics.observe_poll_cycle(summaries.len(), running, elapsed);

                // Every 10 cycles (5 minutes at the default interval)
                if cycle_count % 10 == 0 {
                    logger.log_poll_cycle(
                        summaries.len(),
                        critical_alerts,
                        elapsed.as_millis() as u64,
                    );
                } else {
                    debug!(
                        organizations = summaries.len(),
                        running = running,
                        critical_alerts = critical_alerts,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Fleet poll cycle complete"
                    );
                }
            }
            _ = shutdown.recv() => {
                info!("Shutting down fleet poll loop");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poller_config_default() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
    }
}
