pub mod connection_quality;
pub mod qr_payload;
pub mod record_id;
pub mod session_id;
pub mod sync_failure;
pub mod sync_strategy;

pub use connection_quality::ConnectionQuality;
pub use qr_payload::QrPayload;
pub use record_id::AttendanceRecordId;
pub use session_id::SessionId;
pub use sync_failure::SyncFailureKind;
pub use sync_strategy::SyncStrategy;
