//! Operation log records
//!
//! `RawOperationLog` mirrors the wire shape returned by the backup service.
//! Every nested lookup the report needs is an explicit `Option` defaulting to
//! `None`, so a missing `extra_info` branch never fails decoding.
//! `LogRecord` is the flat, normalized row that ends up in a report.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer};

use super::window::DISPLAY_UTC_OFFSET_HOURS;
use crate::error::{ReportError, ReportResult};

/// Operation type excluded from every report
pub const DELETE_OPERATION: &str = "delete";

/// Response body of the operation-log listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationLogList {
    /// Log entries for the requested window
    #[serde(default)]
    pub operation_logs: Vec<RawOperationLog>,
    /// Total number of matching entries reported by the service
    #[serde(default)]
    pub count: Option<u64>,
}

/// One operation log entry as returned by the backup service
///
/// Scalars may be absent or `null` on any entry; `started_at` is only
/// required once an entry is normalized, so deletions never fail decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOperationLog {
    /// Log identifier (fallback for the task id)
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// backup, restore, delete, replication, ...
    #[serde(default, deserialize_with = "null_as_default")]
    pub operation_type: String,
    /// success, failed, running, ...
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vault_id: String,
    #[serde(default)]
    pub vault_name: Option<String>,
    /// Start time as an RFC 3339 string
    #[serde(default)]
    pub started_at: Option<String>,
    /// End time; absent or empty while the task is running
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub extra_info: Option<ExtraInfo>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Nested `extra_info` of an operation log
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtraInfo {
    #[serde(default)]
    pub common: Option<CommonInfo>,
    #[serde(default)]
    pub backup: Option<BackupInfo>,
    #[serde(default)]
    pub resource: Option<ResourceInfo>,
}

/// `extra_info.common`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonInfo {
    #[serde(default)]
    pub task_id: Option<String>,
}

/// `extra_info.backup`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupInfo {
    #[serde(default)]
    pub backup_id: Option<String>,
}

/// `extra_info.resource`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
}

impl RawOperationLog {
    /// Whether this entry is a deletion (never reported)
    pub fn is_delete(&self) -> bool {
        self.operation_type == DELETE_OPERATION
    }

    /// `extra_info.common.task_id`, or the log id when absent or empty
    pub fn task_id(&self) -> &str {
        self.extra_info
            .as_ref()
            .and_then(|e| e.common.as_ref())
            .and_then(|c| c.task_id.as_deref())
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.id)
    }

    /// `extra_info.backup.backup_id`
    pub fn backup_id(&self) -> Option<&str> {
        self.extra_info
            .as_ref()
            .and_then(|e| e.backup.as_ref())
            .and_then(|b| b.backup_id.as_deref())
    }

    /// `extra_info.resource`
    pub fn resource(&self) -> Option<&ResourceInfo> {
        self.extra_info.as_ref().and_then(|e| e.resource.as_ref())
    }
}

/// A normalized report row, in report column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub task_id: String,
    pub backup_id: Option<String>,
    pub task_type: String,
    pub status: String,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub resource_type: Option<String>,
    pub vault_id: String,
    pub vault_name: Option<String>,
    /// Start time, already shifted to the display offset
    pub started: NaiveDateTime,
    /// End time, already shifted to the display offset
    pub ended: Option<NaiveDateTime>,
}

impl LogRecord {
    /// Normalize a raw entry into a report row
    ///
    /// Deletions are not filtered here; see [`LogRecord::from_raw_logs`].
    pub fn from_raw(raw: &RawOperationLog) -> ReportResult<Self> {
        let started_at = raw
            .started_at
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                ReportError::LogFetch(format!("Operation log '{}' has no start time", raw.id))
            })?;
        let started = to_display_time(started_at)?;
        let ended = match raw.ended_at.as_deref() {
            Some(s) if !s.trim().is_empty() => Some(to_display_time(s)?),
            _ => None,
        };

        let resource = raw.resource();

        Ok(Self {
            task_id: raw.task_id().to_string(),
            backup_id: raw.backup_id().map(str::to_string),
            task_type: raw.operation_type.clone(),
            status: raw.status.clone(),
            resource_id: resource.and_then(|r| r.id.clone()),
            resource_name: resource.and_then(|r| r.name.clone()),
            resource_type: resource.and_then(|r| r.resource_type.clone()),
            vault_id: raw.vault_id.clone(),
            vault_name: raw.vault_name.clone(),
            started,
            ended,
        })
    }

    /// Drop deletions and normalize the rest, preserving order
    pub fn from_raw_logs(raw: &[RawOperationLog]) -> ReportResult<Vec<Self>> {
        raw.iter()
            .filter(|log| !log.is_delete())
            .map(Self::from_raw)
            .collect()
    }
}

/// Parse an RFC 3339 timestamp, shift it into the display offset and drop
/// sub-second precision
///
/// Timestamps without a zone designator are read as UTC.
pub fn to_display_time(raw: &str) -> ReportResult<NaiveDateTime> {
    let utc = parse_utc(raw)?;
    let shifted = utc.naive_utc() + Duration::hours(DISPLAY_UTC_OFFSET_HOURS);
    Ok(shifted.with_nanosecond(0).unwrap_or(shifted))
}

fn parse_utc(raw: &str) -> ReportResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ReportError::LogFetch(format!("Invalid timestamp '{}': {}", raw, e)))
}
