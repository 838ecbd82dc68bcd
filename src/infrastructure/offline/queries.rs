pub(super) const SELECT_RECORDS: &str = r#"
    SELECT id, qr_payload, session_id, student_uuid, captured_at, retry_count,
           last_attempt_at, last_error, queue_state, dead_letter_reason, dead_lettered_at
    FROM offline_attendance_records
    ORDER BY position ASC
"#;

pub(super) const SELECT_SETTINGS: &str = r#"
    SELECT auto_sync_enabled, sync_interval_secs, max_retries, batch_size, sync_strategy
    FROM sync_settings
    WHERE id = 1
"#;

pub(super) const SELECT_STATUS: &str = r#"
    SELECT last_sync_attempt_at, last_successful_sync_at, total_synced, total_failed,
           average_latency_ms
    FROM sync_status
    WHERE id = 1
"#;

pub(super) const DELETE_RECORDS: &str = "DELETE FROM offline_attendance_records";

pub(super) const INSERT_RECORD: &str = r#"
    INSERT INTO offline_attendance_records (
        id,
        position,
        qr_payload,
        session_id,
        student_uuid,
        captured_at,
        retry_count,
        last_attempt_at,
        last_error,
        queue_state,
        dead_letter_reason,
        dead_lettered_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
"#;

pub(super) const UPSERT_SETTINGS: &str = r#"
    INSERT INTO sync_settings (
        id, auto_sync_enabled, sync_interval_secs, max_retries, batch_size, sync_strategy
    ) VALUES (1, ?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
        auto_sync_enabled = excluded.auto_sync_enabled,
        sync_interval_secs = excluded.sync_interval_secs,
        max_retries = excluded.max_retries,
        batch_size = excluded.batch_size,
        sync_strategy = excluded.sync_strategy
"#;

pub(super) const UPSERT_STATUS: &str = r#"
    INSERT INTO sync_status (
        id, last_sync_attempt_at, last_successful_sync_at, total_synced, total_failed,
        average_latency_ms
    ) VALUES (1, ?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
        last_sync_attempt_at = excluded.last_sync_attempt_at,
        last_successful_sync_at = excluded.last_successful_sync_at,
        total_synced = excluded.total_synced,
        total_failed = excluded.total_failed,
        average_latency_ms = excluded.average_latency_ms
"#;
