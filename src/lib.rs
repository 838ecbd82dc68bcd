pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{AttendanceGateway, GatewayError, HealthProbe, SnapshotStore};
pub use application::services::{ConnectionMonitor, OfflineAttendanceQueue, SyncTuning};
pub use domain::entities::{
    AttendanceCapture, BatchSyncResult, DeadLetterReason, OfflineAttendanceRecord, QueueSnapshot,
    SyncSettings,
};
pub use shared::{AppConfig, AppError};
pub use state::AppState;
