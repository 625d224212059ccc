//! CLI command implementations

pub mod mcps;
pub mod monitor;
pub mod summary;
