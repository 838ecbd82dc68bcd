use super::attendance_record::DeadLetterReason;
use crate::domain::value_objects::AttendanceRecordId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a single `sync_one` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOneOutcome {
    Synced {
        latency: Duration,
    },
    RetryScheduled {
        retry_count: u32,
        delay: Duration,
        error: String,
    },
    /// Failed transiently while the queue was stopped; the next batch after
    /// `start()` picks it up.
    RetryDeferred {
        retry_count: u32,
        error: String,
    },
    DeadLettered {
        reason: DeadLetterReason,
        error: String,
    },
    /// The record was not pending or another attempt for it was in flight.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSkipReason {
    AlreadySyncing,
    Offline,
    NothingPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSyncError {
    pub record_id: AttendanceRecordId,
    pub message: String,
    pub dead_lettered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSyncResult {
    pub synced_count: u32,
    pub failed_count: u32,
    pub errors: Vec<BatchSyncError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<BatchSkipReason>,
}

impl BatchSyncResult {
    pub fn skipped(reason: BatchSkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    pub(crate) fn absorb(&mut self, record_id: &AttendanceRecordId, outcome: &SyncOneOutcome) {
        match outcome {
            SyncOneOutcome::Synced { .. } => self.synced_count += 1,
            SyncOneOutcome::RetryScheduled { error, .. }
            | SyncOneOutcome::RetryDeferred { error, .. } => {
                self.failed_count += 1;
                self.errors.push(BatchSyncError {
                    record_id: record_id.clone(),
                    message: error.clone(),
                    dead_lettered: false,
                });
            }
            SyncOneOutcome::DeadLettered { error, .. } => {
                self.failed_count += 1;
                self.errors.push(BatchSyncError {
                    record_id: record_id.clone(),
                    message: error.clone(),
                    dead_lettered: true,
                });
            }
            SyncOneOutcome::Skipped => {}
        }
    }
}
