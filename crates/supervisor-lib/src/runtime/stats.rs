//! Stats table parsing
//!
//! The runtime's stats query yields one comma-delimited row per container
//! with 8 positional fields:
//!
//! `containerId,containerName,cpuPercent%,"memUsage / memLimit",memPercent%,"netIn / netOut","blockIn / blockOut",pids`
//!
//! Parsing favors robustness over precision: a short row is dropped, a
//! malformed numeric sub-field becomes 0, and a size pair missing one half
//! gets "0B" substituted. Nothing here ever fails the caller.

use chrono::Utc;
use tracing::debug;

use crate::models::ResourceUsage;
use crate::naming;

/// Substituted when a size-pair half is missing
const MISSING_SIZE: &str = "0B";

/// Parse one stats data row into a usage record
///
/// Returns `None` when the row has fewer than 8 comma-separated fields.
/// The organization id is recovered by stripping the tenant-container prefix
/// from the reported name; rows for foreign containers keep the raw name and
/// are discarded by the caller's prefix filter.
pub fn parse_stats_line(line: &str) -> Option<ResourceUsage> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 8 {
        debug!(line = %line, "discarding stats row with too few fields");
        return None;
    }

    let container_id = fields[0].trim().to_string();
    let container_name = fields[1].trim().to_string();
    let cpu_percent = parse_percent(fields[2]);
    let (memory_usage, memory_limit) = split_size_pair(fields[3]);
    let memory_percent = parse_percent(fields[4]);
    let (network_in, network_out) = split_size_pair(fields[5]);
    let (block_in, block_out) = split_size_pair(fields[6]);
    let pids = fields[7].trim().parse::<u32>().unwrap_or(0);

    let organization_id = naming::organization_id(&container_name)
        .unwrap_or_else(|| container_name.clone());

    Some(ResourceUsage {
        organization_id,
        container_id,
        container_name,
        cpu_percent,
        memory_usage,
        memory_limit,
        memory_percent,
        network_in,
        network_out,
        block_in,
        block_out,
        pids,
        timestamp: Utc::now().timestamp(),
    })
}

/// Strip a trailing `%` and parse as f64, defaulting to 0 on failure
fn parse_percent(field: &str) -> f64 {
    field
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Split a `"usage / limit"` style field, substituting "0B" for missing halves
fn split_size_pair(field: &str) -> (String, String) {
    let (first, second) = match field.split_once('/') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => (field.trim(), ""),
    };
    (size_or_zero(first), size_or_zero(second))
}

fn size_or_zero(value: &str) -> String {
    if value.is_empty() {
        MISSING_SIZE.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_row() {
        let line = "abc123,teamhub-mcp-acme,12.5%,512MiB / 1GiB,50.0%,1.2kB / 3.4kB,10MB / 20MB,42";
        let usage = parse_stats_line(line).unwrap();

        assert_eq!(usage.container_id, "abc123");
        assert_eq!(usage.container_name, "teamhub-mcp-acme");
        assert_eq!(usage.organization_id, "acme");
        assert_eq!(usage.cpu_percent, 12.5);
        assert_eq!(usage.memory_usage, "512MiB");
        assert_eq!(usage.memory_limit, "1GiB");
        assert_eq!(usage.memory_percent, 50.0);
        assert_eq!(usage.network_in, "1.2kB");
        assert_eq!(usage.network_out, "3.4kB");
        assert_eq!(usage.block_in, "10MB");
        assert_eq!(usage.block_out, "20MB");
        assert_eq!(usage.pids, 42);
    }

    #[test]
    fn test_short_row_rejected() {
        assert!(parse_stats_line("abc123,teamhub-mcp-acme,12.5%").is_none());
        assert!(parse_stats_line("").is_none());
        // 7 fields, one short of the contract
        assert!(parse_stats_line("a,b,1%,c / d,2%,e / f,g / h").is_none());
    }

    #[test]
    fn test_missing_pair_half_substitutes_zero() {
        let line = "abc123,teamhub-mcp-acme,12.5%,512MiB,50.0%,1.2kB / 3.4kB,10MB / 20MB,42";
        let usage = parse_stats_line(line).unwrap();

        assert_eq!(usage.memory_usage, "512MiB");
        assert_eq!(usage.memory_limit, "0B");
    }

    #[test]
    fn test_empty_pair_field_substitutes_both_halves() {
        let line = "abc123,teamhub-mcp-acme,12.5%,,50.0%, / 3.4kB,10MB / 20MB,42";
        let usage = parse_stats_line(line).unwrap();

        assert_eq!(usage.memory_usage, "0B");
        assert_eq!(usage.memory_limit, "0B");
        assert_eq!(usage.network_in, "0B");
        assert_eq!(usage.network_out, "3.4kB");
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let line = "abc123,teamhub-mcp-acme,garbage,512MiB / 1GiB,n/a%,1.2kB / 3.4kB,10MB / 20MB,many";
        let usage = parse_stats_line(line).unwrap();

        assert_eq!(usage.cpu_percent, 0.0);
        assert_eq!(usage.memory_percent, 0.0);
        assert_eq!(usage.pids, 0);
    }

    #[test]
    fn test_foreign_container_keeps_raw_name_as_org() {
        let line = "abc123,postgres,5.0%,512MiB / 1GiB,50.0%,1.2kB / 3.4kB,10MB / 20MB,7";
        let usage = parse_stats_line(line).unwrap();

        assert_eq!(usage.organization_id, "postgres");
        assert_eq!(usage.container_name, "postgres");
    }

    #[test]
    fn test_whitespace_tolerated() {
        let line = " abc123 , teamhub-mcp-acme , 12.5% , 512MiB / 1GiB , 50.0% , 1.2kB / 3.4kB , 10MB / 20MB , 42 ";
        let usage = parse_stats_line(line).unwrap();

        assert_eq!(usage.container_id, "abc123");
        assert_eq!(usage.cpu_percent, 12.5);
        assert_eq!(usage.pids, 42);
    }
}
