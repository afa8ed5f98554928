//! Comparable version markers and version-manifest parsing.

use crate::list::error::{ListLoadError, ListResult};
use crate::list::records::{parse_field, tokenize_records};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A list version marker.
///
/// The sequence alone decides ordering and equality; the release
/// timestamp is informational and excluded from both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub sequence: u64,
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
}

impl VersionInfo {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            released_at: None,
        }
    }
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for VersionInfo {}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence.cmp(&other.sequence)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.released_at {
            Some(ts) => write!(f, "v{} ({})", self.sequence, ts.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "v{}", self.sequence),
        }
    }
}

/// Parse a version manifest: one record, `sequence ["released-at"]`.
pub fn parse_version_manifest(text: &str) -> ListResult<VersionInfo> {
    let records = tokenize_records(text);
    let record = records
        .first()
        .ok_or_else(|| ListLoadError::malformed("version manifest has no records"))?;

    let sequence: u64 = parse_field(record, 0, "version sequence")?;
    let released_at = match record.fields.get(1) {
        Some(raw) => Some(parse_release_time(raw).ok_or_else(|| {
            ListLoadError::malformed(format!(
                "line {}: release time '{}' is not valid",
                record.line_no, raw
            ))
        })?),
        None => None,
    };

    Ok(VersionInfo {
        sequence,
        released_at,
    })
}

/// Parse a manifest timestamp: `YYYY-MM-DD HH:MM:SS` (UTC).
fn parse_release_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}
