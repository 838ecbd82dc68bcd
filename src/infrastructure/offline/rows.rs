use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecordRow {
    pub id: String,
    pub qr_payload: String,
    pub session_id: String,
    pub student_uuid: String,
    pub captured_at: i64,
    pub retry_count: i64,
    pub last_attempt_at: Option<i64>,
    pub last_error: Option<String>,
    pub queue_state: String,
    pub dead_letter_reason: Option<String>,
    pub dead_lettered_at: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SyncSettingsRow {
    pub auto_sync_enabled: bool,
    pub sync_interval_secs: i64,
    pub max_retries: i64,
    pub batch_size: i64,
    pub sync_strategy: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct SyncStatusRow {
    pub last_sync_attempt_at: Option<i64>,
    pub last_successful_sync_at: Option<i64>,
    pub total_synced: i64,
    pub total_failed: i64,
    pub average_latency_ms: f64,
}
