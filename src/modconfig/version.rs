//! Version constraint helpers shared by requirement validation and the
//! lock-file installer.

use anyhow::{anyhow, Result};
use semver::{Version, VersionReq};

/// Parse a version string leniently: a leading `v` is dropped and partial
/// versions are padded (`1.2` becomes `1.2.0`).
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches('v');
    Version::parse(trimmed)
        .or_else(|_| Version::parse(&pad_version(trimmed)))
        .ok()
}

/// Parse a version constraint. An empty constraint or `*` matches anything.
pub fn parse_constraint(constraint: &str) -> Result<VersionReq> {
    let trimmed = constraint.trim();
    if trimmed.is_empty() || trimmed == "latest" {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(trimmed.trim_start_matches('v'))
        .map_err(|e| anyhow!("invalid version constraint '{}': {}", constraint, e))
}

/// Whether `version` satisfies `constraint`. An unparseable version never
/// satisfies a constraint.
pub fn satisfies(constraint: &VersionReq, version: &str) -> bool {
    parse_version(version).is_some_and(|v| constraint.matches(&v))
}

fn pad_version(version: &str) -> String {
    let parts: Vec<&str> = version.split('.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    }
}
