use async_trait::async_trait;
use mockall::mock;

use attendance_sync::application::ports::{
    AttendanceAck, AttendanceGateway, AttendanceSyncRequest, GatewayError, HealthProbe,
    SnapshotStore, SyncNotice, SyncNotifier,
};
use attendance_sync::domain::entities::QueueSnapshot;
use attendance_sync::shared::error::AppError;

mock! {
    pub AttendanceGatewayPort {}

    #[async_trait]
    impl AttendanceGateway for AttendanceGatewayPort {
        async fn submit_scan(
            &self,
            request: &AttendanceSyncRequest,
        ) -> Result<AttendanceAck, GatewayError>;
    }
}

mock! {
    pub HealthProbePort {}

    #[async_trait]
    impl HealthProbe for HealthProbePort {
        async fn probe(&self) -> Result<(), AppError>;
    }
}

mock! {
    pub SnapshotStorePort {}

    #[async_trait]
    impl SnapshotStore for SnapshotStorePort {
        async fn load(&self) -> Result<Option<QueueSnapshot>, AppError>;
        async fn save(&self, snapshot: &QueueSnapshot) -> Result<(), AppError>;
    }
}

mock! {
    pub SyncNotifierPort {}

    impl SyncNotifier for SyncNotifierPort {
        fn notify(&self, notice: SyncNotice);
    }
}
