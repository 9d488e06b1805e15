//! Core types and the scanning-service boundary shared by the rollover pipeline.

pub mod model;
pub mod service;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use model::*;
pub use service::{ScanService, ServiceError};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Name prefix that marks a scan as a rollover. Scans carrying it are never evaluated.
pub const ROLLOVER_PREFIX: &str = "ROLLOVER - ";

pub fn is_rollover_name(name: &str) -> bool {
    name.starts_with(ROLLOVER_PREFIX)
}

/// A host address the service refused to scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Target(pub String);

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target(s.to_string())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }

    #[test]
    fn rollover_prefix_is_detected() {
        assert!(is_rollover_name("ROLLOVER - 1700000000.000000 - Weekly Scan"));
        assert!(!is_rollover_name("Weekly Scan"));
        assert!(!is_rollover_name("rollover - lowercase is a different scan"));
    }

    #[test]
    fn target_serializes_as_plain_string() {
        let t = Target::from("10.0.0.5");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"10.0.0.5\"");
        assert_eq!(t.to_string(), "10.0.0.5");
    }
}
