pub mod attendance_record;
pub mod queue_snapshot;
pub mod sync_metrics;
pub mod sync_result;
pub mod sync_settings;
pub mod validation;

pub use attendance_record::{DeadLetterReason, DeadLetteredRecord, OfflineAttendanceRecord};
pub use queue_snapshot::{QueueSnapshot, SyncStatusCounters};
pub use sync_metrics::SyncMetrics;
pub use sync_result::{BatchSkipReason, BatchSyncError, BatchSyncResult, SyncOneOutcome};
pub use sync_settings::SyncSettings;
pub use validation::{
    AttendanceCapture, CaptureValidationError, CaptureValidator, ValidatedCapture,
    ValidationIssue,
};
