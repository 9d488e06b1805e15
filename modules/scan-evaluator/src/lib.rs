//! Decide whether a scan's last run missed hosts to an exclusion window.

mod notes;

pub use notes::rejected_hosts;

use rollover_core::{FieldError, FolderId, ScanId, ScanResults, ScanService, Target};
use tracing::{debug, warn};

/// Folder used when the result carries no usable folder id.
pub const DEFAULT_FOLDER_ID: FolderId = 0;
/// Start time used when the result carries no usable start; always outside the window.
pub const DEFAULT_SCAN_START: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Skip(SkipReason),
    RolloverNeeded { folder_id: FolderId, missed: Vec<Target> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FetchFailed,
    NoNotes,
    OutsideWindow { scan_start: i64, cutoff: i64 },
    NoRejections,
}

/// Fetches the scan's results and evaluates them. A failed fetch is a skip, never an error.
pub async fn evaluate<S: ScanService + ?Sized>(service: &S, scan_id: ScanId, lookback_hours: u64, now: i64) -> Evaluation {
    debug!(scan_id, "gathering scan results");
    match service.scan_results(scan_id).await {
        Ok(results) => evaluate_results(scan_id, &results, lookback_hours, now),
        Err(e) => {
            warn!(scan_id, error = %e, "error looking up scan; was it deleted while the sweep was running?");
            Evaluation::Skip(SkipReason::FetchFailed)
        }
    }
}

pub fn evaluate_results(scan_id: ScanId, results: &ScanResults, lookback_hours: u64, now: i64) -> Evaluation {
    let Some(notes) = results.notes.as_ref() else {
        debug!(scan_id, "no notes in this scan");
        return Evaluation::Skip(SkipReason::NoNotes);
    };

    let folder_id = results
        .folder_id()
        .unwrap_or_else(|e| defaulted(scan_id, e, DEFAULT_FOLDER_ID));
    let scan_start = results
        .scan_start()
        .unwrap_or_else(|e| defaulted(scan_id, e, DEFAULT_SCAN_START));

    let cutoff = window_start(now, lookback_hours);
    if scan_start < cutoff {
        debug!(scan_id, scan_start, cutoff, lookback_hours, "scan started outside the lookback window");
        return Evaluation::Skip(SkipReason::OutsideWindow { scan_start, cutoff });
    }
    debug!(scan_id, scan_start, lookback_hours, "scan started inside the lookback window");

    let mut missed = Vec::new();
    for note in notes {
        debug!(scan_id, message = %note.message, "note");
        for host in rejected_hosts(&note.message) {
            debug!(scan_id, host = %host, "host was missed");
            missed.push(host);
        }
    }
    debug!(scan_id, total = missed.len(), "missed hosts collected");

    if missed.is_empty() {
        Evaluation::Skip(SkipReason::NoRejections)
    } else {
        Evaluation::RolloverNeeded { folder_id, missed }
    }
}

/// Earliest start time, in unix seconds, that still counts as recent.
pub fn window_start(now: i64, lookback_hours: u64) -> i64 {
    let span = i64::try_from(lookback_hours).unwrap_or(i64::MAX).saturating_mul(3600);
    now.saturating_sub(span)
}

fn defaulted(scan_id: ScanId, e: FieldError, default: i64) -> i64 {
    debug!(scan_id, reason = %e, default, "applying field default");
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollover_core::fake::{results, Call, FakeService};
    use rollover_core::{Note, ScanInfo};
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;
    const REJECT_5: &str = "Rejected attempt to scan 10.0.0.5, as it violates user-defined rules";
    const REJECT_6: &str = "Rejected attempt to scan 10.0.0.6, as it violates user-defined rules";

    fn missed(e: &Evaluation) -> Vec<&str> {
        match e {
            Evaluation::RolloverNeeded { missed, .. } => missed.iter().map(|t| t.0.as_str()).collect(),
            Evaluation::Skip(_) => Vec::new(),
        }
    }

    #[test]
    fn rejection_among_unrelated_notes() {
        let r = results(NOW - 60, 7, &[REJECT_5, "Some unrelated note"]);
        let e = evaluate_results(1, &r, 24, NOW);
        assert_eq!(e, Evaluation::RolloverNeeded { folder_id: 7, missed: vec![Target::from("10.0.0.5")] });
    }

    #[test]
    fn duplicates_across_notes_are_kept() {
        let r = results(NOW - 60, 7, &[REJECT_5, REJECT_6, REJECT_5]);
        assert_eq!(missed(&evaluate_results(1, &r, 24, NOW)), vec!["10.0.0.5", "10.0.0.6", "10.0.0.5"]);
    }

    #[test]
    fn old_scans_skip_regardless_of_notes() {
        let r = results(NOW - 25 * 3600, 7, &[REJECT_5]);
        assert_eq!(
            evaluate_results(1, &r, 24, NOW),
            Evaluation::Skip(SkipReason::OutsideWindow { scan_start: NOW - 25 * 3600, cutoff: NOW - 24 * 3600 })
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let r = results(NOW - 24 * 3600, 7, &[REJECT_5]);
        assert_eq!(missed(&evaluate_results(1, &r, 24, NOW)), vec!["10.0.0.5"]);
        let r = results(NOW - 24 * 3600 - 1, 7, &[REJECT_5]);
        assert!(matches!(evaluate_results(1, &r, 24, NOW), Evaluation::Skip(SkipReason::OutsideWindow { .. })));
    }

    #[test]
    fn missing_notes_field_skips() {
        let r = ScanResults { notes: None, ..results(NOW, 7, &[]) };
        assert_eq!(evaluate_results(1, &r, 24, NOW), Evaluation::Skip(SkipReason::NoNotes));
    }

    #[test]
    fn empty_notes_skip() {
        let r = results(NOW, 7, &["Scan completed"]);
        assert_eq!(evaluate_results(1, &r, 24, NOW), Evaluation::Skip(SkipReason::NoRejections));
    }

    #[test]
    fn missing_start_defaults_to_epoch_and_skips() {
        let r = ScanResults {
            info: Some(ScanInfo { folder_id: Some(json!(7)), ..Default::default() }),
            notes: Some(vec![Note { message: REJECT_5.into() }]),
        };
        assert!(matches!(
            evaluate_results(1, &r, 24, NOW),
            Evaluation::Skip(SkipReason::OutsideWindow { scan_start: DEFAULT_SCAN_START, .. })
        ));
    }

    #[test]
    fn malformed_folder_defaults_to_zero() {
        let mut r = results(NOW - 10, 7, &[REJECT_5]);
        if let Some(info) = r.info.as_mut() {
            info.folder_id = Some(json!("not-a-folder"));
        }
        assert!(matches!(
            evaluate_results(1, &r, 24, NOW),
            Evaluation::RolloverNeeded { folder_id: DEFAULT_FOLDER_ID, .. }
        ));
    }

    #[test]
    fn huge_lookback_saturates() {
        assert_eq!(window_start(NOW, u64::MAX), NOW - i64::MAX);
        assert_eq!(window_start(NOW, 0), NOW);
    }

    #[tokio::test]
    async fn fetch_failure_is_a_skip() {
        let svc = FakeService::new().with_scan(4, "Gone").failing_results(4);
        assert_eq!(evaluate(&svc, 4, 24, NOW).await, Evaluation::Skip(SkipReason::FetchFailed));
        assert_eq!(svc.calls(), vec![Call::ScanResults(4)]);
    }

    #[tokio::test]
    async fn evaluates_fetched_results() {
        let svc = FakeService::new().with_results(4, results(NOW - 3600, 2, &[REJECT_6]));
        assert_eq!(
            evaluate(&svc, 4, 24, NOW).await,
            Evaluation::RolloverNeeded { folder_id: 2, missed: vec![Target::from("10.0.0.6")] }
        );
    }
}
