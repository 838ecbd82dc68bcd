use super::mappers::{
    self, StoredRecord, STATE_DEAD_LETTERED, STATE_PENDING,
};
use super::queries::{
    DELETE_RECORDS, INSERT_RECORD, SELECT_RECORDS, SELECT_SETTINGS, SELECT_STATUS,
    UPSERT_SETTINGS, UPSERT_STATUS,
};
use super::rows::{AttendanceRecordRow, SyncSettingsRow, SyncStatusRow};
use crate::application::ports::SnapshotStore;
use crate::domain::entities::{OfflineAttendanceRecord, QueueSnapshot};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};

/// Keeps the queue snapshot in SQLite so captures survive app restarts.
pub struct SqliteSnapshotStore {
    pool: ConnectionPool,
}

impl SqliteSnapshotStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    async fn insert_record(
        tx: &mut Transaction<'_, Sqlite>,
        position: i64,
        record: &OfflineAttendanceRecord,
        dead_letter: Option<(&str, i64)>,
    ) -> Result<(), AppError> {
        let (state, reason, dead_lettered_at) = match dead_letter {
            Some((reason, at)) => (STATE_DEAD_LETTERED, Some(reason), Some(at)),
            None => (STATE_PENDING, None, None),
        };
        sqlx::query(INSERT_RECORD)
            .bind(record.id().as_str())
            .bind(position)
            .bind(record.qr_payload())
            .bind(record.session_id().as_str())
            .bind(record.student_uuid())
            .bind(record.captured_at().timestamp_millis())
            .bind(i64::from(record.retry_count()))
            .bind(record.last_attempt_at().map(|at| at.timestamp_millis()))
            .bind(record.last_error())
            .bind(state)
            .bind(reason)
            .bind(dead_lettered_at)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self) -> Result<Option<QueueSnapshot>, AppError> {
        let pool = self.pool.get_pool();
        let settings_row = sqlx::query_as::<_, SyncSettingsRow>(SELECT_SETTINGS)
            .fetch_optional(pool)
            .await?;
        let status_row = sqlx::query_as::<_, SyncStatusRow>(SELECT_STATUS)
            .fetch_optional(pool)
            .await?;
        let record_rows = sqlx::query_as::<_, AttendanceRecordRow>(SELECT_RECORDS)
            .fetch_all(pool)
            .await?;

        if settings_row.is_none() && status_row.is_none() && record_rows.is_empty() {
            return Ok(None);
        }

        let mut snapshot = QueueSnapshot::default();
        if let Some(row) = settings_row {
            snapshot.settings = mappers::settings_from_row(row)?;
        }
        if let Some(row) = status_row {
            snapshot.status = mappers::status_from_row(row)?;
        }
        for row in record_rows {
            match mappers::stored_record_from_row(row)? {
                StoredRecord::Pending(record) => snapshot.pending.push(record),
                StoredRecord::DeadLettered(entry) => snapshot.dead_lettered.push(entry),
            }
        }

        tracing::debug!(
            target: "offline::store",
            pending = snapshot.pending.len(),
            dead_lettered = snapshot.dead_lettered.len(),
            "queue snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &QueueSnapshot) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query(DELETE_RECORDS).execute(&mut *tx).await?;

        let mut position = 0_i64;
        for record in &snapshot.pending {
            Self::insert_record(&mut tx, position, record, None).await?;
            position += 1;
        }
        for entry in &snapshot.dead_lettered {
            Self::insert_record(
                &mut tx,
                position,
                &entry.record,
                Some((entry.reason.as_str(), entry.dead_lettered_at.timestamp_millis())),
            )
            .await?;
            position += 1;
        }

        let settings = &snapshot.settings;
        sqlx::query(UPSERT_SETTINGS)
            .bind(settings.auto_sync_enabled())
            .bind(mappers::u64_to_i64(settings.sync_interval().as_secs()))
            .bind(i64::from(settings.max_retries()))
            .bind(settings.batch_size() as i64)
            .bind(settings.sync_strategy().as_str())
            .execute(&mut *tx)
            .await?;

        let status = &snapshot.status;
        sqlx::query(UPSERT_STATUS)
            .bind(status.last_sync_attempt_at.map(|at| at.timestamp_millis()))
            .bind(status.last_successful_sync_at.map(|at| at.timestamp_millis()))
            .bind(mappers::u64_to_i64(status.metrics.total_synced))
            .bind(mappers::u64_to_i64(status.metrics.total_failed))
            .bind(status.metrics.average_latency_ms)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(
            target: "offline::store",
            pending = snapshot.pending.len(),
            dead_lettered = snapshot.dead_lettered.len(),
            "queue snapshot saved"
        );
        Ok(())
    }
}
