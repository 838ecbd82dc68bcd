use crate::domain::entities::{BatchSyncResult, DeadLetterReason};
use crate::domain::value_objects::AttendanceRecordId;

/// User-facing events, typically rendered as toasts by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    Synced {
        record_id: AttendanceRecordId,
    },
    DeadLettered {
        record_id: AttendanceRecordId,
        reason: DeadLetterReason,
        message: String,
    },
    BatchCompleted {
        synced_count: u32,
        failed_count: u32,
    },
}

impl SyncNotice {
    pub fn batch_completed(result: &BatchSyncResult) -> Self {
        SyncNotice::BatchCompleted {
            synced_count: result.synced_count,
            failed_count: result.failed_count,
        }
    }
}

pub trait SyncNotifier: Send + Sync {
    fn notify(&self, notice: SyncNotice);
}
