use crate::models::{ConfigureRequest, CopyRequest, EditorDetails, ScanList};
use crate::TenableIo;
use async_trait::async_trait;
use rollover_core::{FolderId, ScanId, ScanResults, ScanService, ScanSummary, ServiceError, Target};
use tracing::debug;

#[async_trait]
impl ScanService for TenableIo {
    async fn list_scans(&self) -> Result<Vec<ScanSummary>, ServiceError> {
        let url = self.url("scans")?;
        debug!(%url, "listing scans");
        let list: ScanList = self.fetch(self.http.get(url)).await?;
        Ok(list.scans.unwrap_or_default())
    }

    async fn scan_results(&self, scan_id: ScanId) -> Result<ScanResults, ServiceError> {
        let url = self.url(&format!("scans/{}", scan_id))?;
        debug!(%url, scan_id, "fetching scan results");
        self.fetch(self.http.get(url)).await
    }

    async fn copy_scan(&self, scan_id: ScanId, folder_id: FolderId, name: &str) -> Result<ScanSummary, ServiceError> {
        let url = self.url(&format!("scans/{}/copy", scan_id))?;
        debug!(%url, scan_id, folder_id, name, "copying scan");
        let body = CopyRequest { folder_id, name };
        self.fetch(self.http.post(url).json(&body)).await
    }

    async fn configure_targets(&self, scan_id: ScanId, targets: &[Target]) -> Result<(), ServiceError> {
        let editor = self.url(&format!("editor/scan/{}", scan_id))?;
        let details: EditorDetails = self.fetch(self.http.get(editor)).await?;
        let url = self.url(&format!("scans/{}", scan_id))?;
        debug!(%url, scan_id, targets = targets.len(), "configuring scan targets");
        let body = ConfigureRequest::targets(&details.uuid, targets);
        self.execute(self.http.put(url).json(&body)).await
    }

    async fn delete_scan(&self, scan_id: ScanId) -> Result<(), ServiceError> {
        let url = self.url(&format!("scans/{}", scan_id))?;
        debug!(%url, scan_id, "deleting scan");
        self.execute(self.http.delete(url)).await
    }
}
