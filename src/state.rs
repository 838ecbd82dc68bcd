use crate::application::ports::{Clock, SnapshotStore, SyncNotifier};
use crate::application::services::{ConnectionMonitor, OfflineAttendanceQueue, SyncTuning};
use crate::domain::entities::SyncSettings;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::http::{HttpAttendanceGateway, HttpHealthProbe};
use crate::infrastructure::notify::TracingNotifier;
use crate::infrastructure::offline::SqliteSnapshotStore;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Wired-up queue plus the store it persists to.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<OfflineAttendanceQueue>,
    pub store: Arc<dyn SnapshotStore>,
    pool: ConnectionPool,
}

impl AppState {
    /// Opens the database, runs migrations and restores the last saved queue.
    pub async fn initialize(config: &AppConfig) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool = ConnectionPool::from_config(&config.database).await?;
        pool.migrate().await?;
        let store: Arc<dyn SnapshotStore> = Arc::new(SqliteSnapshotStore::new(pool.clone()));

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let notifier: Arc<dyn SyncNotifier> = Arc::new(TracingNotifier);
        let monitor = Arc::new(ConnectionMonitor::new(
            Arc::new(HttpHealthProbe::from_config(config)?),
            clock.clone(),
            config.sync.history_limit,
        ));
        let queue = OfflineAttendanceQueue::new(
            Arc::new(HttpAttendanceGateway::from_config(config)?),
            monitor,
            clock,
            notifier,
            SyncSettings::from(&config.sync),
            SyncTuning::from(&config.sync),
        );

        if let Some(snapshot) = store.load().await? {
            queue.restore(snapshot).await;
        }

        tracing::info!(database = %config.database.url, api = %config.network.api_base_url, "attendance sync ready");
        Ok(Self { queue, store, pool })
    }

    pub async fn persist(&self) -> Result<(), AppError> {
        let snapshot = self.queue.snapshot().await;
        self.store.save(&snapshot).await
    }

    /// Stops timers, saves the queue and closes the pool.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.queue.stop();
        let result = self.persist().await;
        self.pool.close().await;
        result
    }
}
