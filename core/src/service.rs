//! The outbound operations the pipeline needs from the scanning service.

use crate::{FolderId, ScanId, ScanResults, ScanSummary, Target};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Calls are issued one at a time; implementations need not support concurrent use
/// beyond what `Send + Sync` requires.
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Every scan known to the service, in listing order.
    async fn list_scans(&self) -> Result<Vec<ScanSummary>, ServiceError>;

    async fn scan_results(&self, scan_id: ScanId) -> Result<ScanResults, ServiceError>;

    /// Copies a scan into `folder_id` under `name` and returns the new scan.
    async fn copy_scan(
        &self,
        scan_id: ScanId,
        folder_id: FolderId,
        name: &str,
    ) -> Result<ScanSummary, ServiceError>;

    /// Replaces the scan's target list. No other setting is touched.
    async fn configure_targets(&self, scan_id: ScanId, targets: &[Target]) -> Result<(), ServiceError>;

    async fn delete_scan(&self, scan_id: ScanId) -> Result<(), ServiceError>;
}
