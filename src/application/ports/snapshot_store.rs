use crate::domain::entities::QueueSnapshot;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Result<Option<QueueSnapshot>, AppError>;
    /// Replaces whatever was stored before.
    async fn save(&self, snapshot: &QueueSnapshot) -> Result<(), AppError>;
}
