use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type ScanId = i64;
pub type FolderId = i64;

/// One entry of the scan listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub id: ScanId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
}

/// Snapshot of the last run of a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResults {
    #[serde(default)]
    pub info: Option<ScanInfo>,
    #[serde(default)]
    pub notes: Option<Vec<Note>>,
}

/// The `info` block of a scan result. Numeric fields are kept raw so that a
/// malformed value can be told apart from a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanInfo {
    #[serde(default)]
    pub folder_id: Option<Value>,
    #[serde(default)]
    pub scan_start: Option<Value>,
}

/// Only the message text matters; other note fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field `{0}` is missing")]
    Missing(&'static str),
    #[error("field `{0}` is malformed: {1}")]
    Malformed(&'static str, String),
}

impl ScanInfo {
    pub fn folder_id(&self) -> Result<FolderId, FieldError> {
        integer_field("folder_id", self.folder_id.as_ref())
    }

    /// Scan start as a unix timestamp in seconds.
    pub fn scan_start(&self) -> Result<i64, FieldError> {
        integer_field("scan_start", self.scan_start.as_ref())
    }
}

impl ScanResults {
    pub fn folder_id(&self) -> Result<FolderId, FieldError> {
        self.info.as_ref().ok_or(FieldError::Missing("info"))?.folder_id()
    }

    pub fn scan_start(&self) -> Result<i64, FieldError> {
        self.info.as_ref().ok_or(FieldError::Missing("info"))?.scan_start()
    }
}

/// Accepts JSON integers, floats (truncated) and integer strings.
fn integer_field(name: &'static str, raw: Option<&Value>) -> Result<i64, FieldError> {
    match raw {
        None => Err(FieldError::Missing(name)),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| FieldError::Malformed(name, n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| FieldError::Malformed(name, s.clone())),
        Some(other) => Err(FieldError::Malformed(name, other.to_string())),
    }
}
