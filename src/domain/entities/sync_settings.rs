use crate::domain::value_objects::SyncStrategy;
use crate::shared::config::SyncConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_SYNC_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const MIN_RETRIES: u32 = 1;
pub const MAX_RETRIES: u32 = 20;
pub const MAX_BATCH_SIZE: u32 = 100;

/// User-tunable sync settings. Every write is clamped into range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    auto_sync_enabled: bool,
    sync_interval_secs: u64,
    max_retries: u32,
    batch_size: u32,
    sync_strategy: SyncStrategy,
}

impl SyncSettings {
    pub fn new(
        auto_sync_enabled: bool,
        sync_interval: Duration,
        max_retries: u32,
        batch_size: u32,
        sync_strategy: SyncStrategy,
    ) -> Self {
        let mut settings = Self {
            auto_sync_enabled,
            sync_interval_secs: 0,
            max_retries: 0,
            batch_size: 0,
            sync_strategy,
        };
        settings.set_sync_interval(sync_interval);
        settings.set_max_retries(max_retries);
        settings.set_batch_size(batch_size);
        settings
    }

    /// Re-applies the bounds, e.g. after loading values written by an older build.
    pub fn clamped(self) -> Self {
        Self::new(
            self.auto_sync_enabled,
            self.sync_interval(),
            self.max_retries,
            self.batch_size,
            self.sync_strategy,
        )
    }

    pub fn auto_sync_enabled(&self) -> bool {
        self.auto_sync_enabled
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size as usize
    }

    pub fn sync_strategy(&self) -> SyncStrategy {
        self.sync_strategy
    }

    pub fn set_auto_sync_enabled(&mut self, enabled: bool) {
        self.auto_sync_enabled = enabled;
    }

    pub fn set_sync_interval(&mut self, interval: Duration) {
        let clamped = interval.clamp(MIN_SYNC_INTERVAL, MAX_SYNC_INTERVAL);
        self.sync_interval_secs = clamped.as_secs();
    }

    pub fn set_max_retries(&mut self, max_retries: u32) {
        self.max_retries = max_retries.clamp(MIN_RETRIES, MAX_RETRIES);
    }

    pub fn set_batch_size(&mut self, batch_size: u32) {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    }

    pub fn set_sync_strategy(&mut self, strategy: SyncStrategy) {
        self.sync_strategy = strategy;
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::new(true, Duration::from_secs(30), 3, 10, SyncStrategy::Fifo)
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self::new(
            config.auto_sync,
            Duration::from_secs(config.sync_interval),
            config.max_retry,
            config.batch_size,
            config.strategy,
        )
    }
}
