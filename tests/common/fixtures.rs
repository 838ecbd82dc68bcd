use attendance_sync::application::ports::{AttendanceGateway, HealthProbe, SyncNotifier};
use attendance_sync::application::services::{
    ConnectionMonitor, OfflineAttendanceQueue, SyncTuning,
};
use attendance_sync::domain::entities::{AttendanceCapture, OfflineAttendanceRecord, SyncSettings};
use attendance_sync::domain::value_objects::{AttendanceRecordId, SessionId};
use attendance_sync::infrastructure::clock::ManualClock;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::sync::Arc;

pub const STUDENT_UUID: &str = "5f0c2a7e-1b7d-4f55-9d0e-3c1f4a2b8e61";

pub fn qr_payload() -> String {
    format!(r#"{{"uuid":"{STUDENT_UUID}","studentId":"st-2041"}}"#)
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 10, 0, 0).unwrap()
}

pub fn capture_at(captured_at: DateTime<Utc>) -> AttendanceCapture {
    AttendanceCapture {
        qr_payload: qr_payload(),
        session_id: "weekend-class-42".to_string(),
        captured_at,
        student_uuid: Some(STUDENT_UUID.to_string()),
    }
}

pub fn stored_record(id: &str, captured_at: DateTime<Utc>, retry_count: u32) -> OfflineAttendanceRecord {
    OfflineAttendanceRecord::restore(
        AttendanceRecordId::parse(id).unwrap(),
        qr_payload(),
        SessionId::new("weekend-class-42".to_string()).unwrap(),
        STUDENT_UUID.to_string(),
        captured_at,
        retry_count,
        (retry_count > 0).then(|| captured_at + Duration::minutes(1)),
        (retry_count > 0).then(|| "connection refused".to_string()),
    )
}

pub fn test_tuning() -> SyncTuning {
    SyncTuning {
        calendar_offset: Some(FixedOffset::east_opt(0).unwrap()),
        ..SyncTuning::default()
    }
}

pub struct QueueParts {
    pub queue: Arc<OfflineAttendanceQueue>,
    pub clock: Arc<ManualClock>,
}

pub fn build_queue(
    gateway: impl AttendanceGateway + 'static,
    probe: impl HealthProbe + 'static,
    notifier: impl SyncNotifier + 'static,
    settings: SyncSettings,
) -> QueueParts {
    let clock = Arc::new(ManualClock::new(fixed_now()));
    let monitor = Arc::new(ConnectionMonitor::new(Arc::new(probe), clock.clone(), 20));
    let queue = OfflineAttendanceQueue::new(
        Arc::new(gateway),
        monitor,
        clock.clone(),
        Arc::new(notifier),
        settings,
        test_tuning(),
    );
    QueueParts { queue, clock }
}
