use super::rows::{AttendanceRecordRow, SyncSettingsRow, SyncStatusRow};
use crate::domain::entities::{
    DeadLetterReason, DeadLetteredRecord, OfflineAttendanceRecord, SyncMetrics, SyncSettings,
    SyncStatusCounters,
};
use crate::domain::value_objects::{AttendanceRecordId, SessionId, SyncStrategy};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::convert::TryInto;
use std::time::Duration;

pub(super) const STATE_PENDING: &str = "pending";
pub(super) const STATE_DEAD_LETTERED: &str = "dead_lettered";

pub(super) enum StoredRecord {
    Pending(OfflineAttendanceRecord),
    DeadLettered(DeadLetteredRecord),
}

pub(super) fn stored_record_from_row(row: AttendanceRecordRow) -> Result<StoredRecord, AppError> {
    let record = OfflineAttendanceRecord::restore(
        AttendanceRecordId::new(row.id).map_err(AppError::DeserializationError)?,
        row.qr_payload,
        SessionId::new(row.session_id).map_err(AppError::DeserializationError)?,
        row.student_uuid,
        millis_to_datetime(row.captured_at)?,
        try_i64_to_u32(row.retry_count, "retry_count")?,
        row.last_attempt_at.map(millis_to_datetime).transpose()?,
        row.last_error,
    );

    match row.queue_state.as_str() {
        STATE_PENDING => Ok(StoredRecord::Pending(record)),
        STATE_DEAD_LETTERED => {
            let reason = row
                .dead_letter_reason
                .as_deref()
                .map(DeadLetterReason::try_from)
                .transpose()
                .map_err(AppError::DeserializationError)?
                .unwrap_or(DeadLetterReason::RetryBudgetExhausted);
            let dead_lettered_at = match row.dead_lettered_at {
                Some(ts) => millis_to_datetime(ts)?,
                None => record.last_attempt_at().unwrap_or(record.captured_at()),
            };
            Ok(StoredRecord::DeadLettered(DeadLetteredRecord::new(
                record,
                reason,
                dead_lettered_at,
            )))
        }
        other => Err(AppError::DeserializationError(format!(
            "Unknown queue state: {other}"
        ))),
    }
}

pub(super) fn settings_from_row(row: SyncSettingsRow) -> Result<SyncSettings, AppError> {
    let strategy = row
        .sync_strategy
        .parse::<SyncStrategy>()
        .map_err(AppError::DeserializationError)?;
    Ok(SyncSettings::new(
        row.auto_sync_enabled,
        Duration::from_secs(try_i64_to_u64(row.sync_interval_secs, "sync_interval_secs")?),
        try_i64_to_u32(row.max_retries, "max_retries")?,
        try_i64_to_u32(row.batch_size, "batch_size")?,
        strategy,
    ))
}

pub(super) fn status_from_row(row: SyncStatusRow) -> Result<SyncStatusCounters, AppError> {
    Ok(SyncStatusCounters {
        last_sync_attempt_at: row.last_sync_attempt_at.map(millis_to_datetime).transpose()?,
        last_successful_sync_at: row
            .last_successful_sync_at
            .map(millis_to_datetime)
            .transpose()?,
        metrics: SyncMetrics {
            total_synced: try_i64_to_u64(row.total_synced, "total_synced")?,
            total_failed: try_i64_to_u64(row.total_failed, "total_failed")?,
            average_latency_ms: row.average_latency_ms,
        },
    })
}

pub(super) fn u64_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn try_i64_to_u32(value: i64, label: &str) -> Result<u32, AppError> {
    value
        .try_into()
        .map_err(|_| AppError::ValidationError(format!("{label} is out of range")))
}

fn try_i64_to_u64(value: i64, label: &str) -> Result<u64, AppError> {
    value
        .try_into()
        .map_err(|_| AppError::ValidationError(format!("{label} cannot be negative")))
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid timestamp: {ms}")))
}
