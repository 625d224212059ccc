//! Tenant container naming convention
//!
//! Every tenant organization owns exactly one tool-server container, addressed
//! as `teamhub-mcp-{organization_id}`. The prefix is how containers are
//! located in the runtime and how organization ids are recovered from
//! listing/stats output.

/// Fixed name prefix for tenant tool-server containers
pub const CONTAINER_PREFIX: &str = "teamhub-mcp-";

/// Container name for an organization
pub fn container_name(organization_id: &str) -> String {
    format!("{}{}", CONTAINER_PREFIX, organization_id)
}

/// Recover the organization id from a runtime-reported container name
pub fn organization_id(container_name: &str) -> Option<String> {
    container_name
        .strip_prefix(CONTAINER_PREFIX)
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

/// Whether a runtime-reported name belongs to a tenant container
pub fn is_tenant_container(container_name: &str) -> bool {
    organization_id(container_name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_name() {
        assert_eq!(container_name("acme"), "teamhub-mcp-acme");
    }

    #[test]
    fn test_organization_id_roundtrip() {
        let name = container_name("org-42");
        assert_eq!(organization_id(&name), Some("org-42".to_string()));
    }

    #[test]
    fn test_organization_id_rejects_foreign_names() {
        assert_eq!(organization_id("postgres"), None);
        assert_eq!(organization_id("mcp-acme"), None);
        // A bare prefix with no id is not a tenant container
        assert_eq!(organization_id("teamhub-mcp-"), None);
    }

    #[test]
    fn test_is_tenant_container() {
        assert!(is_tenant_container("teamhub-mcp-acme"));
        assert!(!is_tenant_container("redis-cache"));
    }
}
