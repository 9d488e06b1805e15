//! Clone a scan into a rollover restricted to the hosts it missed.

use rollover_core::{FolderId, ScanId, ScanService, ServiceError, Target, ROLLOVER_PREFIX};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRollover {
    pub scan_id: ScanId,
    pub source_scan_id: ScanId,
    pub name: String,
    pub folder_id: FolderId,
    pub targets: Vec<Target>,
}

#[derive(Debug, Error)]
pub enum RolloverError {
    #[error("error creating rollover scan for scan ID {scan_id} in folder ID {folder_id} with name \"{name}\": {source}")]
    Copy { scan_id: ScanId, folder_id: FolderId, name: String, source: ServiceError },
    #[error("rollover scan {new_scan_id} (\"{name}\") could not be given its targets and was deleted: {source}")]
    Configure { scan_id: ScanId, new_scan_id: ScanId, name: String, source: ServiceError },
    #[error("orphaned rollover scan {new_scan_id} (\"{name}\") keeps the targets of scan {scan_id}; delete it manually: {source}; delete failed: {delete_error}")]
    Orphaned {
        scan_id: ScanId,
        new_scan_id: ScanId,
        name: String,
        source: ServiceError,
        delete_error: ServiceError,
    },
}

impl RolloverError {
    pub fn source_scan_id(&self) -> ScanId {
        match self {
            RolloverError::Copy { scan_id, .. }
            | RolloverError::Configure { scan_id, .. }
            | RolloverError::Orphaned { scan_id, .. } => *scan_id,
        }
    }
}

/// `ROLLOVER - <unix seconds>.<micros> - <source name>`.
pub fn rollover_name(source_name: &str, now: OffsetDateTime) -> String {
    format!("{}{}.{:06} - {}", ROLLOVER_PREFIX, now.unix_timestamp(), now.microsecond(), source_name)
}

/// Copies `scan_id` into `folder_id` and points the copy at `missed`.
///
/// If the copy cannot be reconfigured it is deleted again, so a failure never
/// leaves behind a scan that would rescan the source's full target list
/// unless the delete fails too ([`RolloverError::Orphaned`]).
pub async fn create<S: ScanService + ?Sized>(
    service: &S,
    source_name: &str,
    scan_id: ScanId,
    folder_id: FolderId,
    missed: &[Target],
    now: OffsetDateTime,
) -> Result<CreatedRollover, RolloverError> {
    let name = rollover_name(source_name, now);
    debug!(scan_id, folder_id, name = %name, "copying scan");

    let copy = match service.copy_scan(scan_id, folder_id, &name).await {
        Ok(copy) => copy,
        Err(source) => return Err(RolloverError::Copy { scan_id, folder_id, name, source }),
    };
    debug!(scan_id, new_scan_id = copy.id, "scan copied");

    if let Err(source) = service.configure_targets(copy.id, missed).await {
        warn!(new_scan_id = copy.id, error = %source, "reconfiguring rollover failed, deleting it");
        return Err(match service.delete_scan(copy.id).await {
            Ok(()) => RolloverError::Configure { scan_id, new_scan_id: copy.id, name, source },
            Err(delete_error) => RolloverError::Orphaned { scan_id, new_scan_id: copy.id, name, source, delete_error },
        });
    }

    Ok(CreatedRollover { scan_id: copy.id, source_scan_id: scan_id, name, folder_id, targets: missed.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollover_core::fake::{Call, FakeService};
    use time::macros::datetime;

    fn now() -> OffsetDateTime {
        datetime!(2023-11-14 22:13:20.000123 UTC)
    }

    fn hosts() -> Vec<Target> {
        vec![Target::from("10.0.0.5"), Target::from("10.0.0.6")]
    }

    #[test]
    fn name_carries_prefix_timestamp_and_source() {
        assert_eq!(rollover_name("Weekly Scan", now()), "ROLLOVER - 1700000000.000123 - Weekly Scan");
    }

    #[tokio::test]
    async fn copies_into_folder_then_sets_exact_targets() {
        let svc = FakeService::new().with_scan(12, "Weekly Scan");
        let created = create(&svc, "Weekly Scan", 12, 7, &hosts(), now()).await.unwrap();

        let name = "ROLLOVER - 1700000000.000123 - Weekly Scan".to_string();
        assert_eq!(
            svc.calls(),
            vec![
                Call::CopyScan { scan_id: 12, folder_id: 7, name: name.clone() },
                Call::ConfigureTargets { scan_id: 1000, targets: vec!["10.0.0.5".into(), "10.0.0.6".into()] },
            ]
        );
        assert_eq!(
            created,
            CreatedRollover { scan_id: 1000, source_scan_id: 12, name, folder_id: 7, targets: hosts() }
        );
    }

    #[tokio::test]
    async fn copy_failure_skips_reconfigure() {
        let svc = FakeService::new().with_scan(12, "Weekly Scan").failing_copy(12);
        let err = create(&svc, "Weekly Scan", 12, 7, &hosts(), now()).await.unwrap_err();
        assert!(matches!(err, RolloverError::Copy { scan_id: 12, folder_id: 7, .. }));
        assert_eq!(svc.calls().len(), 1);
        assert!(err.to_string().contains("with name \"ROLLOVER - 1700000000.000123 - Weekly Scan\""));
    }

    #[tokio::test]
    async fn configure_failure_deletes_the_copy() {
        let svc = FakeService::new().with_scan(12, "Weekly Scan").failing_configure();
        let err = create(&svc, "Weekly Scan", 12, 7, &hosts(), now()).await.unwrap_err();
        assert!(matches!(err, RolloverError::Configure { new_scan_id: 1000, .. }));
        assert_eq!(svc.calls().last(), Some(&Call::DeleteScan(1000)));
        assert_eq!(svc.scan_names(), vec!["Weekly Scan"]);
    }

    #[tokio::test]
    async fn failed_rollback_reports_orphan() {
        let svc = FakeService::new().with_scan(12, "Weekly Scan").failing_configure().failing_delete();
        let err = create(&svc, "Weekly Scan", 12, 7, &hosts(), now()).await.unwrap_err();
        assert!(matches!(err, RolloverError::Orphaned { scan_id: 12, new_scan_id: 1000, .. }));
        assert_eq!(err.source_scan_id(), 12);
        assert!(err.to_string().contains("delete it manually"));
    }
}
