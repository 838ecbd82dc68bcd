pub mod connection_monitor;
pub mod offline_queue;

pub use connection_monitor::{ConnectionEvent, ConnectionMonitor, ConnectionSnapshot};
pub use offline_queue::{DiagnosticsReport, OfflineAttendanceQueue, QueueStatus, SyncTuning};
