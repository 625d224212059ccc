//! Health check infrastructure for the supervisor
//!
//! Tracks per-component health and overall readiness for the admin API's
//! liveness and readiness endpoints.

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is experiencing issues but still operational
    Degraded,
    /// Component has failed
    Unhealthy,
}

impl ComponentStatus {
    /// Returns true if the component is at least partially operational
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

/// Information about a component's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            last_check_timestamp: Utc::now().timestamp(),
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Degraded,
            message: Some(message.into()),
            last_check_timestamp: Utc::now().timestamp(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            message: Some(message.into()),
            last_check_timestamp: Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Compute overall status from component statuses
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        let mut has_degraded = false;

        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => has_degraded = true,
                ComponentStatus::Healthy => {}
            }
        }

        if has_degraded {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const CONTAINER_RUNTIME: &str = "container_runtime";
    pub const LIFECYCLE_MANAGER: &str = "lifecycle_manager";
    pub const RESOURCE_MONITOR: &str = "resource_monitor";
    pub const POLLER: &str = "poller";
    pub const API: &str = "api";
}

/// Health registry for tracking component health
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<DashMap<String, ComponentHealth>>,
    ready: Arc<AtomicBool>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub fn register(&self, name: &str) {
        self.components
            .insert(name.to_string(), ComponentHealth::healthy());
    }

    /// Update component health status
    pub fn update(&self, name: &str, health: ComponentHealth) {
        self.components.insert(name.to_string(), health);
    }

    /// Mark component as healthy
    pub fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy());
    }

    /// Mark component as degraded
    pub fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message));
    }

    /// Mark component as unhealthy
    pub fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message));
    }

    /// Set readiness status
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Snapshot of component health plus the computed overall status
    pub fn health(&self) -> HealthResponse {
        let components: HashMap<String, ComponentHealth> = self
            .components
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Readiness for traffic: initialized and no component failed
    pub fn readiness(&self) -> ReadinessResponse {
        if !self.ready.load(Ordering::SeqCst) {
            return ReadinessResponse {
                ready: false,
                reason: Some("Supervisor not yet initialized".to_string()),
            };
        }

        if self.health().status == ComponentStatus::Unhealthy {
            return ReadinessResponse {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            };
        }

        ReadinessResponse {
            ready: true,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health();

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[test]
    fn test_health_registry_component_registration() {
        let registry = HealthRegistry::new();
        registry.register(components::CONTAINER_RUNTIME);

        let health = registry.health();
        assert!(health.components.contains_key(components::CONTAINER_RUNTIME));
        assert_eq!(
            health.components[components::CONTAINER_RUNTIME].status,
            ComponentStatus::Healthy
        );
    }

    #[test]
    fn test_health_registry_degraded_status() {
        let registry = HealthRegistry::new();
        registry.register(components::CONTAINER_RUNTIME);
        registry.register(components::RESOURCE_MONITOR);

        registry.set_degraded(components::RESOURCE_MONITOR, "Stats queries timing out");

        let health = registry.health();
        assert_eq!(health.status, ComponentStatus::Degraded);
    }

    #[test]
    fn test_health_registry_unhealthy_status() {
        let registry = HealthRegistry::new();
        registry.register(components::CONTAINER_RUNTIME);
        registry.register(components::POLLER);

        registry.set_unhealthy(components::CONTAINER_RUNTIME, "docker binary not found");

        let health = registry.health();
        assert_eq!(health.status, ComponentStatus::Unhealthy);
    }

    #[test]
    fn test_readiness_not_ready_initially() {
        let registry = HealthRegistry::new();
        let readiness = registry.readiness();

        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[test]
    fn test_readiness_ready_when_set() {
        let registry = HealthRegistry::new();
        registry.set_ready(true);

        let readiness = registry.readiness();
        assert!(readiness.ready);
    }

    #[test]
    fn test_readiness_not_ready_when_unhealthy() {
        let registry = HealthRegistry::new();
        registry.register(components::CONTAINER_RUNTIME);
        registry.set_ready(true);
        registry.set_unhealthy(components::CONTAINER_RUNTIME, "docker daemon unreachable");

        let readiness = registry.readiness();
        assert!(!readiness.ready);
    }
}
