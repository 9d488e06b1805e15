use rollover_core::{FolderId, ScanSummary, Target};
use serde::{Deserialize, Serialize};

/// `GET /scans`. The service sends `"scans": null` for an empty account.
#[derive(Debug, Deserialize)]
pub(crate) struct ScanList {
    #[serde(default)]
    pub scans: Option<Vec<ScanSummary>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CopyRequest<'a> {
    pub folder_id: FolderId,
    pub name: &'a str,
}

/// `GET /editor/scan/{id}`; only the template uuid is needed to update a scan.
#[derive(Debug, Deserialize)]
pub(crate) struct EditorDetails {
    pub uuid: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfigureRequest<'a> {
    pub uuid: &'a str,
    pub settings: TargetSettings,
}

#[derive(Debug, Serialize)]
pub(crate) struct TargetSettings {
    pub text_targets: String,
}

impl<'a> ConfigureRequest<'a> {
    pub fn targets(uuid: &'a str, targets: &[Target]) -> Self {
        let text_targets = targets.iter().map(|t| t.0.as_str()).collect::<Vec<_>>().join(",");
        ConfigureRequest { uuid, settings: TargetSettings { text_targets } }
    }
}
