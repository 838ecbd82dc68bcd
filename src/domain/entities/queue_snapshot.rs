use super::attendance_record::{DeadLetteredRecord, OfflineAttendanceRecord};
use super::sync_metrics::SyncMetrics;
use super::sync_settings::SyncSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusCounters {
    pub last_sync_attempt_at: Option<DateTime<Utc>>,
    pub last_successful_sync_at: Option<DateTime<Utc>>,
    pub metrics: SyncMetrics,
}

/// The part of the queue that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub pending: Vec<OfflineAttendanceRecord>,
    pub dead_lettered: Vec<DeadLetteredRecord>,
    pub status: SyncStatusCounters,
    pub settings: SyncSettings,
}
