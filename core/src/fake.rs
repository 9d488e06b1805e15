//! In-memory `ScanService` that records every call, for tests.

use crate::{FolderId, Note, ScanId, ScanInfo, ScanResults, ScanService, ScanSummary, ServiceError, Target};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListScans,
    ScanResults(ScanId),
    CopyScan { scan_id: ScanId, folder_id: FolderId, name: String },
    ConfigureTargets { scan_id: ScanId, targets: Vec<String> },
    DeleteScan(ScanId),
}

#[derive(Debug, Default)]
struct State {
    scans: Vec<ScanSummary>,
    results: HashMap<ScanId, ScanResults>,
    failing_results: HashSet<ScanId>,
    failing_copies: HashSet<ScanId>,
    fail_list: bool,
    fail_configure: bool,
    fail_delete: bool,
    next_id: ScanId,
    calls: Vec<Call>,
}

#[derive(Debug)]
pub struct FakeService {
    state: Mutex<State>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeService {
    pub fn new() -> Self {
        FakeService { state: Mutex::new(State { next_id: 1000, ..Default::default() }) }
    }

    pub fn with_scan(self, id: ScanId, name: &str) -> Self {
        self.state().scans.push(ScanSummary { id, name: name.to_string(), folder_id: None });
        self
    }

    pub fn with_results(self, id: ScanId, results: ScanResults) -> Self {
        self.state().results.insert(id, results);
        self
    }

    pub fn failing_results(self, id: ScanId) -> Self {
        self.state().failing_results.insert(id);
        self
    }

    pub fn failing_copy(self, id: ScanId) -> Self {
        self.state().failing_copies.insert(id);
        self
    }

    pub fn failing_list(self) -> Self {
        self.state().fail_list = true;
        self
    }

    pub fn failing_configure(self) -> Self {
        self.state().fail_configure = true;
        self
    }

    pub fn failing_delete(self) -> Self {
        self.state().fail_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Names of scans currently held, including any created by copies.
    pub fn scan_names(&self) -> Vec<String> {
        self.state().scans.iter().map(|s| s.name.clone()).collect()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn status(code: u16, body: &str) -> ServiceError {
    ServiceError::Status { status: code, body: body.to_string() }
}

#[async_trait]
impl ScanService for FakeService {
    async fn list_scans(&self) -> Result<Vec<ScanSummary>, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::ListScans);
        if st.fail_list {
            return Err(ServiceError::Transport("connection refused".into()));
        }
        Ok(st.scans.clone())
    }

    async fn scan_results(&self, scan_id: ScanId) -> Result<ScanResults, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::ScanResults(scan_id));
        if st.failing_results.contains(&scan_id) {
            return Err(status(404, "scan not found"));
        }
        st.results.get(&scan_id).cloned().ok_or_else(|| status(404, "scan not found"))
    }

    async fn copy_scan(&self, scan_id: ScanId, folder_id: FolderId, name: &str) -> Result<ScanSummary, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::CopyScan { scan_id, folder_id, name: name.to_string() });
        if st.failing_copies.contains(&scan_id) {
            return Err(status(403, "copy not permitted"));
        }
        let id = st.next_id;
        st.next_id += 1;
        let copy = ScanSummary { id, name: name.to_string(), folder_id: Some(folder_id) };
        st.scans.push(copy.clone());
        Ok(copy)
    }

    async fn configure_targets(&self, scan_id: ScanId, targets: &[Target]) -> Result<(), ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::ConfigureTargets {
            scan_id,
            targets: targets.iter().map(|t| t.0.clone()).collect(),
        });
        if st.fail_configure {
            return Err(status(500, "internal error"));
        }
        Ok(())
    }

    async fn delete_scan(&self, scan_id: ScanId) -> Result<(), ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::DeleteScan(scan_id));
        if st.fail_delete {
            return Err(status(500, "internal error"));
        }
        st.scans.retain(|s| s.id != scan_id);
        Ok(())
    }
}

/// Builds a result snapshot with the given start time, folder and note messages.
pub fn results(scan_start: i64, folder_id: FolderId, messages: &[&str]) -> ScanResults {
    ScanResults {
        info: Some(ScanInfo {
            folder_id: Some(folder_id.into()),
            scan_start: Some(scan_start.into()),
        }),
        notes: Some(
            messages
                .iter()
                .map(|m| Note { message: m.to_string() })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_adds_a_scan_and_records_the_call() {
        let svc = FakeService::new().with_scan(1, "Weekly Scan");
        let copy = svc.copy_scan(1, 7, "ROLLOVER - x - Weekly Scan").await.unwrap();
        assert_eq!(copy.id, 1000);
        assert_eq!(svc.scan_names(), vec!["Weekly Scan", "ROLLOVER - x - Weekly Scan"]);
        assert_eq!(
            svc.calls(),
            vec![Call::CopyScan { scan_id: 1, folder_id: 7, name: "ROLLOVER - x - Weekly Scan".into() }]
        );
    }

    #[tokio::test]
    async fn unknown_results_are_not_found() {
        let svc = FakeService::new();
        assert!(matches!(svc.scan_results(9).await, Err(ServiceError::Status { status: 404, .. })));
    }
}
