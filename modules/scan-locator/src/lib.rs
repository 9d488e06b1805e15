//! Resolve a scan name to its identifier.

use rollover_core::{ScanId, ScanService, ScanSummary, ServiceError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("could not find scan name: {0}")]
    NotFound(String),
    #[error("failed to list scans: {0}")]
    List(#[from] ServiceError),
}

/// Exact-match lookup. When several scans share the name, the one listed last wins.
pub fn last_match(scans: &[ScanSummary], name: &str) -> Option<ScanId> {
    let mut found = None;
    for scan in scans {
        if scan.name == name {
            debug!(scan_id = scan.id, name, "found scan by name");
            found = Some(scan.id);
        }
    }
    found
}

/// Lists every scan on the service and returns the identifier of the named one.
pub async fn locate<S: ScanService + ?Sized>(service: &S, name: &str) -> Result<ScanId, LocateError> {
    debug!(name, "searching for scan");
    let scans = service.list_scans().await?;
    last_match(&scans, name).ok_or_else(|| LocateError::NotFound(name.to_string()))
}
