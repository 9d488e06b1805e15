//! One pass over every scan: locate, evaluate, create rollovers.

use crate::report::Report;
use rollover_core::{is_rollover_name, ScanId, ScanService, ServiceError};
use scan_evaluator::Evaluation;
use scan_locator::LocateError;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Only this scan is evaluated when set.
    pub scan_name: Option<String>,
    pub lookback_hours: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub listed: usize,
    pub evaluated: usize,
    pub matched: usize,
    pub created: usize,
    pub failed: usize,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("could not find scan name: {0}")]
    ScanNotFound(String),
    #[error("failed to list scans: {0}")]
    List(#[source] ServiceError),
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl From<LocateError> for SweepError {
    fn from(e: LocateError) -> Self {
        match e {
            LocateError::NotFound(name) => SweepError::ScanNotFound(name),
            LocateError::List(e) => SweepError::List(e),
        }
    }
}

pub async fn sweep<S, R>(service: &S, cfg: &SweepConfig, now: OffsetDateTime, report: &mut R) -> Result<SweepSummary, SweepError>
where
    S: ScanService + ?Sized,
    R: Report + ?Sized,
{
    let wanted: Option<ScanId> = match cfg.scan_name.as_deref() {
        Some(name) => {
            let id = scan_locator::locate(service, name).await?;
            debug!(scan_id = id, name, "found scan ID");
            Some(id)
        }
        None => None,
    };

    info!(lookback_hours = cfg.lookback_hours, "retrieving list of all scans");
    let scans = service.list_scans().await.map_err(SweepError::List)?;
    let mut summary = SweepSummary { listed: scans.len(), ..Default::default() };

    for scan in &scans {
        debug!(scan_id = scan.id, name = %scan.name, "scan");
        if is_rollover_name(&scan.name) {
            debug!(scan_id = scan.id, "not evaluating a rollover scan");
            continue;
        }
        match wanted {
            Some(id) if id != scan.id => continue,
            Some(_) => {}
            None => report.progress()?,
        }

        summary.evaluated += 1;
        let (folder_id, missed) = match scan_evaluator::evaluate(service, scan.id, cfg.lookback_hours, now.unix_timestamp()).await {
            Evaluation::RolloverNeeded { folder_id, missed } => (folder_id, missed),
            Evaluation::Skip(reason) => {
                debug!(scan_id = scan.id, ?reason, "no rollover needed");
                continue;
            }
        };

        summary.matched += 1;
        debug!(scan_id = scan.id, missed = ?missed, "creating a rollover scan");
        match rollover_creator::create(service, &scan.name, scan.id, folder_id, &missed, now).await {
            Ok(created) => {
                summary.created += 1;
                report.created(&created)?;
            }
            Err(e) => {
                summary.failed += 1;
                report.failed(&e)?;
            }
        }
    }

    report.finished(&summary)?;
    Ok(summary)
}
