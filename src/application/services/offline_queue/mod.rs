//! Offline attendance queue.
//!
//! Captures taken while the device cannot reach the API are buffered here and
//! replayed with retry, backoff and dead-lettering. The queue owns the
//! pending and dead-lettered sets outright; nothing else mutates them.

mod backoff;
mod diagnostics;
mod selection;
mod tuning;

#[cfg(test)]
mod tests;

pub use backoff::retry_delay;
pub use diagnostics::{DeadLetterDigest, DiagnosticsReport, PendingDigest, QueueStatus};
pub use selection::select_batch;
pub use tuning::SyncTuning;

use crate::application::ports::{
    AttendanceGateway, AttendanceSyncRequest, Clock, SyncNotice, SyncNotifier,
};
use crate::application::services::connection_monitor::ConnectionMonitor;
use crate::domain::entities::{
    AttendanceCapture, BatchSkipReason, BatchSyncResult, CaptureValidationError,
    CaptureValidator, DeadLetterReason, DeadLetteredRecord, OfflineAttendanceRecord,
    QueueSnapshot, SyncMetrics, SyncOneOutcome, SyncSettings, SyncStatusCounters,
};
use crate::domain::value_objects::{
    AttendanceRecordId, ConnectionQuality, SyncFailureKind, SyncStrategy,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct QueueState {
    pending: Vec<OfflineAttendanceRecord>,
    dead_lettered: Vec<DeadLetteredRecord>,
    in_flight: HashSet<AttendanceRecordId>,
    retry_timers: HashMap<AttendanceRecordId, JoinHandle<()>>,
    status: SyncStatusCounters,
    settings: SyncSettings,
}

impl QueueState {
    fn pending_index(&self, id: &AttendanceRecordId) -> Option<usize> {
        self.pending.iter().position(|record| record.id() == id)
    }

    fn dead_letter_index(&self, id: &AttendanceRecordId) -> Option<usize> {
        self.dead_lettered.iter().position(|entry| entry.id() == id)
    }

    /// A retry timer is still waiting to fire for this record.
    fn is_backing_off(&self, id: &AttendanceRecordId) -> bool {
        self.retry_timers
            .get(id)
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Moves `pending[index]` to the dead-letter set.
    fn dead_letter(
        &mut self,
        index: usize,
        reason: DeadLetterReason,
        at: DateTime<Utc>,
    ) -> SyncNotice {
        let record = self.pending.remove(index);
        if let Some(timer) = self.retry_timers.remove(record.id()) {
            timer.abort();
        }
        let notice = SyncNotice::DeadLettered {
            record_id: record.id().clone(),
            reason,
            message: record
                .last_error()
                .map(str::to_string)
                .unwrap_or_else(|| reason.to_string()),
        };
        tracing::warn!(
            target: "offline::queue",
            record_id = %record.id(),
            session_id = %record.session_id(),
            retry_count = record.retry_count(),
            reason = %reason,
            "attendance record dead-lettered"
        );
        self.dead_lettered
            .push(DeadLetteredRecord::new(record, reason, at));
        notice
    }
}

struct Lifecycle {
    shutdown: CancellationToken,
    recurring: Option<(CancellationToken, JoinHandle<()>)>,
    /// Set by `stop()`; no retry timer is armed until the next `start()`.
    stopped: bool,
}

/// Resets `is_syncing` when a batch ends, however it ends.
struct SyncingGuard<'a>(&'a AtomicBool);

impl<'a> SyncingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct OfflineAttendanceQueue {
    gateway: Arc<dyn AttendanceGateway>,
    monitor: Arc<ConnectionMonitor>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn SyncNotifier>,
    validator: CaptureValidator,
    tuning: SyncTuning,
    state: Mutex<QueueState>,
    is_syncing: AtomicBool,
    lifecycle: StdMutex<Lifecycle>,
}

impl OfflineAttendanceQueue {
    pub fn new(
        gateway: Arc<dyn AttendanceGateway>,
        monitor: Arc<ConnectionMonitor>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn SyncNotifier>,
        settings: SyncSettings,
        tuning: SyncTuning,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            monitor,
            clock,
            notifier,
            validator: CaptureValidator::new(tuning.max_record_age),
            tuning,
            state: Mutex::new(QueueState {
                settings,
                ..QueueState::default()
            }),
            is_syncing: AtomicBool::new(false),
            lifecycle: StdMutex::new(Lifecycle {
                shutdown: CancellationToken::new(),
                recurring: None,
                stopped: false,
            }),
        })
    }

    pub fn monitor(&self) -> &Arc<ConnectionMonitor> {
        &self.monitor
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing.load(Ordering::Acquire)
    }

    /// Validates and buffers a capture.
    ///
    /// When the API looks reachable the record is also pushed right away on a
    /// background task; the caller never waits for the network.
    pub async fn enqueue(
        self: &Arc<Self>,
        capture: AttendanceCapture,
    ) -> Result<AttendanceRecordId, CaptureValidationError> {
        let now = self.clock.now();
        let validated = self.validator.validate(&capture, now).map_err(|err| {
            tracing::warn!(
                target: "offline::queue",
                session_id = %capture.session_id,
                error = %err,
                "attendance capture rejected"
            );
            err
        })?;

        let id = AttendanceRecordId::generate();
        let record = OfflineAttendanceRecord::new(id.clone(), validated);
        tracing::info!(
            target: "offline::queue",
            record_id = %id,
            session_id = %record.session_id(),
            "attendance capture queued"
        );
        self.state.lock().await.pending.push(record);

        if self.monitor.is_effectively_online() {
            let queue = Arc::clone(self);
            let record_id = id.clone();
            tokio::spawn(async move {
                queue.sync_one(&record_id).await;
            });
        }

        Ok(id)
    }

    /// One round-trip for one pending record.
    ///
    /// Returns `Skipped` when the record is not pending or already being sent,
    /// so concurrent callers can never submit the same record twice.
    pub async fn sync_one(self: &Arc<Self>, id: &AttendanceRecordId) -> SyncOneOutcome {
        let now = self.clock.now();
        let request = {
            let mut state = self.state.lock().await;
            if state.in_flight.contains(id) {
                return SyncOneOutcome::Skipped;
            }
            let Some(index) = state.pending_index(id) else {
                return SyncOneOutcome::Skipped;
            };

            if let Err(err) = self.validator.revalidate(&state.pending[index], now) {
                let reason = if err.is_expired() {
                    DeadLetterReason::Expired
                } else {
                    DeadLetterReason::Invalid
                };
                let error = err.to_string();
                let notice = state.dead_letter(index, reason, now);
                drop(state);
                self.notifier.notify(notice);
                return SyncOneOutcome::DeadLettered { reason, error };
            }

            if state.pending[index].retry_count() >= state.settings.max_retries() {
                let reason = DeadLetterReason::RetryBudgetExhausted;
                let notice = state.dead_letter(index, reason, now);
                drop(state);
                self.notifier.notify(notice);
                return SyncOneOutcome::DeadLettered {
                    reason,
                    error: reason.to_string(),
                };
            }

            let record = &mut state.pending[index];
            record.mark_attempt(now);
            let request = AttendanceSyncRequest::from(&*record);
            state.in_flight.insert(id.clone());
            state.status.last_sync_attempt_at = Some(now);
            request
        };

        let started = Instant::now();
        let result = self.gateway.submit_scan(&request).await;
        let latency = started.elapsed();
        let finished_at = self.clock.now();

        let mut state = self.state.lock().await;
        state.in_flight.remove(id);

        let err = match result {
            Ok(_) => {
                if let Some(index) = state.pending_index(id) {
                    state.pending.remove(index);
                }
                state.status.metrics.record_success(latency);
                state.status.last_successful_sync_at = Some(finished_at);
                drop(state);

                tracing::info!(
                    target: "offline::queue",
                    record_id = %id,
                    latency_ms = latency.as_millis() as u64,
                    "attendance record synced"
                );
                self.notifier.notify(SyncNotice::Synced {
                    record_id: id.clone(),
                });
                return SyncOneOutcome::Synced { latency };
            }
            Err(err) => err,
        };

        state.status.metrics.record_failure();
        let error = err.to_string();
        let Some(index) = state.pending_index(id) else {
            // Replaced by a restore while the request was out.
            return SyncOneOutcome::Skipped;
        };

        let previous_count = state.pending[index].retry_count();
        let retry_count = state.pending[index].record_failure(error.clone());
        let kind = err.kind();
        tracing::debug!(
            target: "offline::queue",
            record_id = %id,
            retry_count,
            kind = ?kind,
            error = %error,
            "attendance sync attempt failed"
        );

        let reason = match kind {
            SyncFailureKind::Permanent => Some(DeadLetterReason::PermanentFailure),
            SyncFailureKind::Transient if retry_count >= state.settings.max_retries() => {
                Some(DeadLetterReason::RetryBudgetExhausted)
            }
            SyncFailureKind::Transient => None,
        };

        if let Some(reason) = reason {
            let notice = state.dead_letter(index, reason, finished_at);
            drop(state);
            self.notifier.notify(notice);
            return SyncOneOutcome::DeadLettered { reason, error };
        }

        let delay = retry_delay(
            previous_count,
            self.tuning.backoff_base,
            self.tuning.backoff_max,
        );
        if !self.schedule_retry(&mut state, id.clone(), delay) {
            return SyncOneOutcome::RetryDeferred { retry_count, error };
        }
        SyncOneOutcome::RetryScheduled {
            retry_count,
            delay,
            error,
        }
    }

    /// Sends up to `batch_size` eligible records, one after another.
    ///
    /// Never fails: individual failures are reported in the result.
    pub async fn sync_batch(self: &Arc<Self>) -> BatchSyncResult {
        if !self.monitor.is_effectively_online() {
            return BatchSyncResult::skipped(BatchSkipReason::Offline);
        }
        let Some(_syncing) = SyncingGuard::acquire(&self.is_syncing) else {
            return BatchSyncResult::skipped(BatchSkipReason::AlreadySyncing);
        };

        let now = self.clock.now();
        let mut result = BatchSyncResult::default();
        let (selection, notices) = {
            let mut state = self.state.lock().await;
            if state.pending.is_empty() {
                return BatchSyncResult::skipped(BatchSkipReason::NothingPending);
            }
            state.status.last_sync_attempt_at = Some(now);

            let mut notices = Vec::new();
            for (id, error) in self.expire_stale(&mut state, now, &mut notices) {
                result.absorb(
                    &id,
                    &SyncOneOutcome::DeadLettered {
                        reason: DeadLetterReason::Expired,
                        error,
                    },
                );
            }

            let settings = state.settings.clone();
            let selection = select_batch(
                &state.pending,
                settings.sync_strategy(),
                now,
                self.tuning.calendar_offset_at(now),
                settings.batch_size(),
                |record| {
                    !state.in_flight.contains(record.id())
                        && !state.is_backing_off(record.id())
                        && self.should_retry_sync_with(record, &settings, now)
                },
            );
            (selection, notices)
        };
        for notice in notices {
            self.notifier.notify(notice);
        }

        tracing::debug!(
            target: "offline::queue",
            selected = selection.len(),
            "attendance batch sync started"
        );

        for (position, id) in selection.iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.item_delay()).await;
                if !self.monitor.is_effectively_online() {
                    tracing::info!(
                        target: "offline::queue",
                        remaining = selection.len() - position,
                        "connection lost, batch stopped early"
                    );
                    break;
                }
            }
            let outcome = self.sync_one(id).await;
            result.absorb(id, &outcome);
        }

        tracing::info!(
            target: "offline::queue",
            synced = result.synced_count,
            failed = result.failed_count,
            "attendance batch sync finished"
        );
        self.notifier.notify(SyncNotice::batch_completed(&result));
        result
    }

    /// Moves a dead-lettered record back to pending and tries it once.
    ///
    /// Refuses unknown ids and records that are too old to be accepted.
    pub async fn retry_dead_lettered(self: &Arc<Self>, id: &AttendanceRecordId) -> bool {
        let now = self.clock.now();
        {
            let mut state = self.state.lock().await;
            let Some(index) = state.dead_letter_index(id) else {
                return false;
            };
            let captured_at = state.dead_lettered[index].record.captured_at();
            if self.validator.is_expired(captured_at, now) {
                tracing::info!(
                    target: "offline::queue",
                    record_id = %id,
                    "expired record cannot be retried"
                );
                return false;
            }

            let mut entry = state.dead_lettered.remove(index);
            entry.record.reset_retries();
            state.pending.push(entry.record);
        }
        tracing::info!(target: "offline::queue", record_id = %id, "dead-lettered record requeued");

        if self.monitor.is_effectively_online() {
            self.sync_one(id).await;
        }
        true
    }

    /// Drops a dead-lettered record for good. Pending records cannot be discarded.
    pub async fn discard_dead_lettered(&self, id: &AttendanceRecordId) -> bool {
        let mut state = self.state.lock().await;
        match state.dead_letter_index(id) {
            Some(index) => {
                let entry = state.dead_lettered.remove(index);
                tracing::info!(
                    target: "offline::queue",
                    record_id = %id,
                    reason = %entry.reason,
                    "dead-lettered record discarded"
                );
                true
            }
            None => false,
        }
    }

    pub async fn clear_dead_lettered(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.dead_lettered.len();
        state.dead_lettered.clear();
        removed
    }

    /// Pending, not expired, and still within the retry budget.
    pub async fn should_retry_sync(&self, record: &OfflineAttendanceRecord) -> bool {
        let settings = self.state.lock().await.settings.clone();
        self.should_retry_sync_with(record, &settings, self.clock.now())
    }

    fn should_retry_sync_with(
        &self,
        record: &OfflineAttendanceRecord,
        settings: &SyncSettings,
        now: DateTime<Utc>,
    ) -> bool {
        record.captured_at() <= now
            && !self.validator.is_expired(record.captured_at(), now)
            && record.retry_count() < settings.max_retries()
    }

    /// Applies a platform online/offline signal.
    ///
    /// Coming back online with pending records starts a batch in the
    /// background; the handle is returned for callers that want to wait.
    pub async fn set_online_status(
        self: &Arc<Self>,
        online: bool,
    ) -> Option<JoinHandle<BatchSyncResult>> {
        if !self.monitor.set_online_status(online) {
            return None;
        }
        if self.state.lock().await.pending.is_empty() {
            return None;
        }
        let queue = Arc::clone(self);
        Some(tokio::spawn(async move { queue.sync_batch().await }))
    }

    /// Probes the API and feeds the result back as the online signal.
    pub async fn refresh_connection(
        self: &Arc<Self>,
    ) -> (ConnectionQuality, Option<JoinHandle<BatchSyncResult>>) {
        let quality = self.monitor.test_connection().await;
        let handle = self.set_online_status(quality.is_usable()).await;
        (quality, handle)
    }

    /// Arms the recurring sync timer and lets failures schedule retries again
    /// after a `stop()`. The timer stays off while auto-sync is disabled.
    ///
    /// Calling it again re-arms the timer with the current interval.
    pub async fn start(self: &Arc<Self>) -> bool {
        let auto_sync = self.state.lock().await.settings.auto_sync_enabled();

        let mut lifecycle = self.lifecycle();
        if lifecycle.stopped {
            lifecycle.shutdown = CancellationToken::new();
            lifecycle.stopped = false;
        }
        if !auto_sync {
            return false;
        }
        if let Some((token, _)) = lifecycle.recurring.take() {
            token.cancel();
        }
        let token = lifecycle.shutdown.child_token();
        let handle = tokio::spawn(Arc::clone(self).run_recurring(token.clone()));
        lifecycle.recurring = Some((token, handle));
        tracing::debug!(target: "offline::queue", "recurring sync armed");
        true
    }

    /// Cancels the recurring timer and every scheduled retry.
    ///
    /// A batch or request already running is left to finish, but a failure it
    /// reports no longer arms a retry until `start()` is called again.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle();
        lifecycle.shutdown.cancel();
        lifecycle.stopped = true;
        lifecycle.recurring = None;
        tracing::debug!(target: "offline::queue", "offline queue stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle()
            .recurring
            .as_ref()
            .is_some_and(|(token, handle)| !token.is_cancelled() && !handle.is_finished())
    }

    async fn run_recurring(self: Arc<Self>, token: CancellationToken) {
        loop {
            let interval = {
                let state = self.state.lock().await;
                if !state.settings.auto_sync_enabled() {
                    break;
                }
                state.settings.sync_interval()
            };

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let result = self.sync_batch().await;
            if let Some(reason) = result.skipped {
                tracing::trace!(target: "offline::queue", reason = ?reason, "scheduled sync skipped");
            }
        }
    }

    fn schedule_retry(
        self: &Arc<Self>,
        state: &mut QueueState,
        id: AttendanceRecordId,
        delay: Duration,
    ) -> bool {
        let token = {
            let lifecycle = self.lifecycle();
            if lifecycle.stopped {
                tracing::debug!(
                    target: "offline::queue",
                    record_id = %id,
                    "queue stopped, retry left to the next batch"
                );
                return false;
            }
            lifecycle.shutdown.clone()
        };
        let queue = Arc::clone(self);
        let record_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            queue.state.lock().await.retry_timers.remove(&record_id);
            if queue.monitor.is_effectively_online() {
                queue.sync_one(&record_id).await;
            }
        });
        if let Some(previous) = state.retry_timers.insert(id, handle) {
            previous.abort();
        }
        true
    }

    fn expire_stale(
        &self,
        state: &mut QueueState,
        now: DateTime<Utc>,
        notices: &mut Vec<SyncNotice>,
    ) -> Vec<(AttendanceRecordId, String)> {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < state.pending.len() {
            let record = &state.pending[index];
            if !state.in_flight.contains(record.id())
                && self.validator.is_expired(record.captured_at(), now)
            {
                let id = record.id().clone();
                notices.push(state.dead_letter(index, DeadLetterReason::Expired, now));
                expired.push((id, DeadLetterReason::Expired.to_string()));
            } else {
                index += 1;
            }
        }
        expired
    }

    fn exhaust_over_budget(&self, state: &mut QueueState, now: DateTime<Utc>) -> Vec<SyncNotice> {
        let max_retries = state.settings.max_retries();
        let mut notices = Vec::new();
        let mut index = 0;
        while index < state.pending.len() {
            let record = &state.pending[index];
            if !state.in_flight.contains(record.id()) && record.retry_count() >= max_retries {
                notices.push(state.dead_letter(
                    index,
                    DeadLetterReason::RetryBudgetExhausted,
                    now,
                ));
            } else {
                index += 1;
            }
        }
        notices
    }

    fn item_delay(&self) -> Duration {
        match self.monitor.quality() {
            ConnectionQuality::Poor => self.tuning.poor_connection_item_delay,
            _ => self.tuning.item_delay,
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Settings

    pub async fn settings(&self) -> SyncSettings {
        self.state.lock().await.settings.clone()
    }

    pub async fn set_auto_sync_enabled(self: &Arc<Self>, enabled: bool) {
        self.state
            .lock()
            .await
            .settings
            .set_auto_sync_enabled(enabled);
        if enabled {
            self.start().await;
            return;
        }
        let recurring = self.lifecycle().recurring.take();
        if let Some((token, _)) = recurring {
            token.cancel();
        }
    }

    pub async fn set_sync_interval(self: &Arc<Self>, interval: Duration) {
        self.state.lock().await.settings.set_sync_interval(interval);
        if self.is_running() {
            self.start().await;
        }
    }

    /// Lowering the budget dead-letters records that already used it up.
    pub async fn set_max_retries(&self, max_retries: u32) {
        let now = self.clock.now();
        let notices = {
            let mut state = self.state.lock().await;
            state.settings.set_max_retries(max_retries);
            self.exhaust_over_budget(&mut state, now)
        };
        for notice in notices {
            self.notifier.notify(notice);
        }
    }

    pub async fn set_batch_size(&self, batch_size: u32) {
        self.state.lock().await.settings.set_batch_size(batch_size);
    }

    pub async fn set_sync_strategy(&self, strategy: SyncStrategy) {
        self.state
            .lock()
            .await
            .settings
            .set_sync_strategy(strategy);
    }

    // Persistence

    pub async fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock().await;
        QueueSnapshot {
            pending: state.pending.clone(),
            dead_lettered: state.dead_lettered.clone(),
            status: state.status.clone(),
            settings: state.settings.clone(),
        }
    }

    /// Replaces the queue contents with a previously taken snapshot.
    ///
    /// Ids found in both sets stay dead-lettered, and records over the
    /// restored retry budget are dead-lettered straight away.
    pub async fn restore(&self, snapshot: QueueSnapshot) {
        let now = self.clock.now();
        let QueueSnapshot {
            pending,
            dead_lettered,
            status,
            settings,
        } = snapshot;

        let notices = {
            let mut state = self.state.lock().await;
            for (_, timer) in state.retry_timers.drain() {
                timer.abort();
            }

            let dead_ids: HashSet<AttendanceRecordId> =
                dead_lettered.iter().map(|entry| entry.id().clone()).collect();
            let mut seen = HashSet::new();
            let before = pending.len();
            state.pending = pending
                .into_iter()
                .filter(|record| !dead_ids.contains(record.id()) && seen.insert(record.id().clone()))
                .collect();
            if state.pending.len() != before {
                tracing::warn!(
                    target: "offline::queue",
                    dropped = before - state.pending.len(),
                    "duplicate records dropped while restoring"
                );
            }
            state.dead_lettered = dead_lettered;
            state.status = status;
            state.settings = settings.clamped();
            self.exhaust_over_budget(&mut state, now)
        };
        for notice in notices {
            self.notifier.notify(notice);
        }

        let state = self.state.lock().await;
        tracing::info!(
            target: "offline::queue",
            pending = state.pending.len(),
            dead_lettered = state.dead_lettered.len(),
            "offline queue restored"
        );
    }

    // Diagnostics

    pub async fn pending_records(&self) -> Vec<OfflineAttendanceRecord> {
        self.state.lock().await.pending.clone()
    }

    pub async fn dead_lettered_records(&self) -> Vec<DeadLetteredRecord> {
        self.state.lock().await.dead_lettered.clone()
    }

    pub async fn metrics(&self) -> SyncMetrics {
        self.state.lock().await.status.metrics.clone()
    }

    pub async fn status(&self) -> QueueStatus {
        let state = self.state.lock().await;
        self.status_from(&state)
    }

    pub async fn export_diagnostics(&self) -> DiagnosticsReport {
        let state = self.state.lock().await;
        DiagnosticsReport {
            generated_at: self.clock.now(),
            status: self.status_from(&state),
            settings: state.settings.clone(),
            connection: self.monitor.snapshot(),
            pending: state
                .pending
                .iter()
                .map(|record| PendingDigest::new(record, state.in_flight.contains(record.id())))
                .collect(),
            dead_lettered: state.dead_lettered.iter().map(DeadLetterDigest::from).collect(),
        }
    }

    fn status_from(&self, state: &QueueState) -> QueueStatus {
        QueueStatus {
            pending_count: state.pending.len(),
            dead_letter_count: state.dead_lettered.len(),
            in_flight_count: state.in_flight.len(),
            is_syncing: self.is_syncing(),
            is_online: self.monitor.is_effectively_online(),
            last_sync_attempt_at: state.status.last_sync_attempt_at,
            last_successful_sync_at: state.status.last_successful_sync_at,
            metrics: state.status.metrics.clone(),
            success_rate: state.status.metrics.success_rate(),
        }
    }
}
