use crate::shared::error::AppError;
use async_trait::async_trait;

/// Lightweight reachability check against the API's health endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> Result<(), AppError>;
}
