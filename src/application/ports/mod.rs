pub mod attendance_gateway;
pub mod clock;
pub mod health_probe;
pub mod notifier;
pub mod snapshot_store;

pub use attendance_gateway::{AttendanceAck, AttendanceGateway, AttendanceSyncRequest, GatewayError};
pub use clock::Clock;
pub use health_probe::HealthProbe;
pub use notifier::{SyncNotice, SyncNotifier};
pub use snapshot_store::SnapshotStore;
