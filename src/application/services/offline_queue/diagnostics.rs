use crate::application::services::connection_monitor::ConnectionSnapshot;
use crate::domain::entities::{
    DeadLetterReason, DeadLetteredRecord, OfflineAttendanceRecord, SyncMetrics, SyncSettings,
};
use crate::domain::value_objects::AttendanceRecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the UI shows permanently: counts, last attempt and health.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub pending_count: usize,
    pub dead_letter_count: usize,
    pub in_flight_count: usize,
    pub is_syncing: bool,
    pub is_online: bool,
    pub last_sync_attempt_at: Option<DateTime<Utc>>,
    pub last_successful_sync_at: Option<DateTime<Utc>>,
    pub metrics: SyncMetrics,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDigest {
    pub id: AttendanceRecordId,
    pub session_id: String,
    pub student_uuid: String,
    pub captured_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub in_flight: bool,
}

impl PendingDigest {
    pub(super) fn new(record: &OfflineAttendanceRecord, in_flight: bool) -> Self {
        Self {
            id: record.id().clone(),
            session_id: record.session_id().to_string(),
            student_uuid: record.student_uuid().to_string(),
            captured_at: record.captured_at(),
            retry_count: record.retry_count(),
            last_attempt_at: record.last_attempt_at(),
            last_error: record.last_error().map(str::to_string),
            in_flight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterDigest {
    pub id: AttendanceRecordId,
    pub session_id: String,
    pub student_uuid: String,
    pub captured_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub reason: DeadLetterReason,
    pub dead_lettered_at: DateTime<Utc>,
}

impl From<&DeadLetteredRecord> for DeadLetterDigest {
    fn from(entry: &DeadLetteredRecord) -> Self {
        Self {
            id: entry.id().clone(),
            session_id: entry.record.session_id().to_string(),
            student_uuid: entry.record.student_uuid().to_string(),
            captured_at: entry.record.captured_at(),
            retry_count: entry.record.retry_count(),
            last_error: entry.record.last_error().map(str::to_string),
            reason: entry.reason,
            dead_lettered_at: entry.dead_lettered_at,
        }
    }
}

/// Full export handed to support when a device keeps failing to sync.
///
/// QR payloads are left out; the digests carry enough to find the scan server-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub generated_at: DateTime<Utc>,
    pub status: QueueStatus,
    pub settings: SyncSettings,
    pub connection: ConnectionSnapshot,
    pub pending: Vec<PendingDigest>,
    pub dead_lettered: Vec<DeadLetterDigest>,
}

impl DiagnosticsReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
