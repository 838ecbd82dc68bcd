use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Running sync counters. Diagnostic only; never used for queue decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetrics {
    pub total_synced: u64,
    pub total_failed: u64,
    pub average_latency_ms: f64,
}

impl SyncMetrics {
    pub fn record_success(&mut self, latency: Duration) {
        self.total_synced = self.total_synced.saturating_add(1);
        let sample = latency.as_secs_f64() * 1_000.0;
        let n = self.total_synced as f64;
        self.average_latency_ms += (sample - self.average_latency_ms) / n;
    }

    pub fn record_failure(&mut self) {
        self.total_failed = self.total_failed.saturating_add(1);
    }

    /// Share of attempts that succeeded; 1.0 before the first attempt.
    pub fn success_rate(&self) -> f64 {
        let attempts = self.total_synced + self.total_failed;
        if attempts == 0 {
            1.0
        } else {
            self.total_synced as f64 / attempts as f64
        }
    }
}
