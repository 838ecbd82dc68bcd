use super::*;
use crate::application::ports::{AttendanceAck, GatewayError, HealthProbe};
use crate::infrastructure::clock::ManualClock;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use std::collections::VecDeque;
use tokio::time::Instant;

const QR: &str = r#"{"uuid":"U1","studentId":"st-100"}"#;

/// Answers scan writes from a script; once the script runs out every call succeeds.
#[derive(Default)]
struct ScriptedGateway {
    script: StdMutex<VecDeque<Result<AttendanceAck, GatewayError>>>,
    fallback: Option<GatewayError>,
    delay: Duration,
    calls: StdMutex<Vec<AttendanceSyncRequest>>,
    call_times: StdMutex<Vec<Instant>>,
}

impl ScriptedGateway {
    fn ok() -> Self {
        Self::default()
    }

    fn failing(err: GatewayError) -> Self {
        Self {
            fallback: Some(err),
            ..Self::default()
        }
    }

    fn with_script(script: Vec<Result<AttendanceAck, GatewayError>>) -> Self {
        Self {
            script: StdMutex::new(script.into()),
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<AttendanceSyncRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Gap between each submit and the one before it.
    fn gaps(&self) -> Vec<Duration> {
        let times = self.call_times.lock().unwrap();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }
}

#[async_trait]
impl AttendanceGateway for ScriptedGateway {
    async fn submit_scan(
        &self,
        request: &AttendanceSyncRequest,
    ) -> Result<AttendanceAck, GatewayError> {
        self.calls.lock().unwrap().push(request.clone());
        self.call_times.lock().unwrap().push(Instant::now());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        match &self.fallback {
            Some(err) => Err(err.clone()),
            None => Ok(AttendanceAck::default()),
        }
    }
}

struct AlwaysUp;

#[async_trait]
impl HealthProbe for AlwaysUp {
    async fn probe(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Healthy, but answers after a fixed lag.
struct LaggingHealth(Duration);

#[async_trait]
impl HealthProbe for LaggingHealth {
    async fn probe(&self) -> Result<(), AppError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: StdMutex<Vec<SyncNotice>>,
}

impl SyncNotifier for RecordingNotifier {
    fn notify(&self, notice: SyncNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<SyncNotice> {
        self.notices.lock().unwrap().clone()
    }
}

struct Harness {
    queue: Arc<OfflineAttendanceQueue>,
    gateway: Arc<ScriptedGateway>,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new(gateway: ScriptedGateway) -> Self {
        Self::with_settings(gateway, SyncSettings::default())
    }

    fn with_settings(gateway: ScriptedGateway, settings: SyncSettings) -> Self {
        Self::with_health(gateway, settings, Arc::new(AlwaysUp))
    }

    fn with_health(
        gateway: ScriptedGateway,
        settings: SyncSettings,
        health: Arc<dyn HealthProbe>,
    ) -> Self {
        let clock = Arc::new(ManualClock::default());
        clock.set(Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap());
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor = Arc::new(ConnectionMonitor::new(health, clock.clone(), 8));
        let tuning = SyncTuning {
            calendar_offset: Some(FixedOffset::east_opt(0).unwrap()),
            ..SyncTuning::default()
        };
        let queue = OfflineAttendanceQueue::new(
            gateway.clone(),
            monitor,
            clock.clone(),
            notifier.clone(),
            settings,
            tuning,
        );
        Self {
            queue,
            gateway,
            clock,
            notifier,
        }
    }

    fn capture(&self, age: chrono::Duration) -> AttendanceCapture {
        AttendanceCapture {
            qr_payload: QR.to_string(),
            session_id: "S1".to_string(),
            captured_at: self.clock.now() - age,
            student_uuid: None,
        }
    }

    /// Enqueues without triggering the immediate push, then flips the monitor
    /// back online without starting a batch.
    async fn enqueue_offline(&self, age: chrono::Duration) -> AttendanceRecordId {
        self.queue.monitor().set_online_status(false);
        let id = self.queue.enqueue(self.capture(age)).await.unwrap();
        self.queue.monitor().set_online_status(true);
        id
    }
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

fn settings(max_retries: u32, batch_size: u32, strategy: SyncStrategy) -> SyncSettings {
    SyncSettings::new(true, Duration::from_secs(30), max_retries, batch_size, strategy)
}

fn transport_error() -> GatewayError {
    GatewayError::Transport("connection refused".into())
}

#[tokio::test(start_paused = true)]
async fn online_capture_is_pushed_right_away() {
    let h = Harness::new(ScriptedGateway::ok());

    let id = h
        .queue
        .enqueue(h.capture(chrono::Duration::minutes(1)))
        .await
        .unwrap();
    settle().await;

    let calls = h.gateway.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_offline_sync);
    assert_eq!(calls[0].student_uuid, "U1");
    assert!(h.queue.pending_records().await.is_empty());

    let status = h.queue.status().await;
    assert_eq!(status.metrics.total_synced, 1);
    assert!(status.last_successful_sync_at.is_some());
    assert!(h
        .notifier
        .notices()
        .contains(&SyncNotice::Synced { record_id: id }));
}

#[tokio::test(start_paused = true)]
async fn offline_capture_waits_for_reconnect() {
    let h = Harness::new(ScriptedGateway::ok());
    assert!(h.queue.set_online_status(false).await.is_none());

    h.queue
        .enqueue(h.capture(chrono::Duration::minutes(5)))
        .await
        .unwrap();
    settle().await;
    assert!(h.gateway.calls().is_empty());
    assert_eq!(h.queue.status().await.pending_count, 1);

    let handle = h
        .queue
        .set_online_status(true)
        .await
        .expect("reconnect starts a batch");
    let result = handle.await.unwrap();

    assert_eq!(result.synced_count, 1);
    assert_eq!(result.failed_count, 0);
    assert!(h.queue.pending_records().await.is_empty());
    assert!(h.notifier.notices().contains(&SyncNotice::BatchCompleted {
        synced_count: 1,
        failed_count: 0
    }));
}

#[tokio::test(start_paused = true)]
async fn invalid_capture_is_refused_without_queueing() {
    let h = Harness::new(ScriptedGateway::ok());
    let mut capture = h.capture(chrono::Duration::minutes(1));
    capture.qr_payload = "not json".into();
    capture.session_id = " ".into();

    let err = h.queue.enqueue(capture).await.unwrap_err();
    assert_eq!(err.issues().len(), 2);
    settle().await;
    assert!(h.queue.pending_records().await.is_empty());
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn permanent_rejection_is_dead_lettered_at_once() {
    let h = Harness::new(ScriptedGateway::failing(GatewayError::Rejected {
        status: 200,
        message: "duplicate scan".into(),
    }));
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;

    let outcome = h.queue.sync_one(&id).await;
    assert_eq!(
        outcome,
        SyncOneOutcome::DeadLettered {
            reason: DeadLetterReason::PermanentFailure,
            error: "duplicate scan".into()
        }
    );

    let dead = h.queue.dead_lettered_records().await;
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].record.retry_count(), 1);
    assert_eq!(dead[0].record.last_error(), Some("duplicate scan"));
    assert!(h.queue.pending_records().await.is_empty());
    assert!(h.notifier.notices().contains(&SyncNotice::DeadLettered {
        record_id: id,
        reason: DeadLetterReason::PermanentFailure,
        message: "duplicate scan".into()
    }));
}

#[tokio::test(start_paused = true)]
async fn transient_failures_back_off_until_budget_is_spent() {
    let h = Harness::with_settings(
        ScriptedGateway::failing(transport_error()),
        settings(3, 10, SyncStrategy::Fifo),
    );
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;

    let outcome = h.queue.sync_one(&id).await;
    assert!(matches!(
        outcome,
        SyncOneOutcome::RetryScheduled { retry_count: 1, delay, .. } if delay == Duration::from_secs(1)
    ));

    tokio::time::sleep(Duration::from_millis(999)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 2);
    assert_eq!(h.queue.pending_records().await[0].retry_count(), 2);

    // Second retry waits twice as long.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 2);
    tokio::time::sleep(Duration::from_millis(600)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 3);

    assert!(h.queue.pending_records().await.is_empty());
    let dead = h.queue.dead_lettered_records().await;
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].reason, DeadLetterReason::RetryBudgetExhausted);
    assert_eq!(dead[0].record.retry_count(), 3);

    tokio::time::sleep(Duration::from_secs(120)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 3);
    assert_eq!(h.queue.metrics().await.total_failed, 3);
}

#[tokio::test(start_paused = true)]
async fn concurrent_sync_one_submits_once() {
    let h = Harness::new(ScriptedGateway::slow(Duration::from_millis(200)));
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;

    let (first, second) = tokio::join!(h.queue.sync_one(&id), h.queue.sync_one(&id));

    assert!(matches!(first, SyncOneOutcome::Synced { .. }));
    assert_eq!(second, SyncOneOutcome::Skipped);
    assert_eq!(h.gateway.calls().len(), 1);
    assert_eq!(h.queue.sync_one(&id).await, SyncOneOutcome::Skipped);
}

#[tokio::test(start_paused = true)]
async fn expired_records_are_dead_lettered_instead_of_sent() {
    let h = Harness::new(ScriptedGateway::ok());
    let id = h.enqueue_offline(chrono::Duration::hours(1)).await;
    h.clock.advance(chrono::Duration::hours(24));

    let result = h.queue.sync_batch().await;

    assert_eq!(result.synced_count, 0);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.errors[0].record_id, id);
    assert!(result.errors[0].dead_lettered);
    assert!(h.gateway.calls().is_empty());
    assert_eq!(
        h.queue.dead_lettered_records().await[0].reason,
        DeadLetterReason::Expired
    );
}

#[tokio::test(start_paused = true)]
async fn dead_lettered_record_can_be_retried_once_fixed() {
    let h = Harness::new(ScriptedGateway::with_script(vec![Err(
        GatewayError::Rejected {
            status: 409,
            message: "session not open yet".into(),
        },
    )]));
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;
    h.queue.sync_one(&id).await;
    assert_eq!(h.queue.dead_lettered_records().await.len(), 1);

    assert!(h.queue.retry_dead_lettered(&id).await);

    assert_eq!(h.gateway.calls().len(), 2);
    assert!(h.queue.dead_lettered_records().await.is_empty());
    assert!(h.queue.pending_records().await.is_empty());
    assert!(!h.queue.retry_dead_lettered(&id).await);
}

#[tokio::test(start_paused = true)]
async fn expired_dead_letter_cannot_be_retried() {
    let h = Harness::new(ScriptedGateway::failing(GatewayError::Rejected {
        status: 422,
        message: "unknown student".into(),
    }));
    let id = h.enqueue_offline(chrono::Duration::hours(2)).await;
    h.queue.sync_one(&id).await;
    h.clock.advance(chrono::Duration::hours(23));

    assert!(!h.queue.retry_dead_lettered(&id).await);
    assert_eq!(h.queue.dead_lettered_records().await.len(), 1);
    assert_eq!(h.gateway.calls().len(), 1);

    assert!(h.queue.discard_dead_lettered(&id).await);
    assert!(!h.queue.discard_dead_lettered(&id).await);
    assert_eq!(h.queue.clear_dead_lettered().await, 0);
}

#[tokio::test(start_paused = true)]
async fn batch_is_skipped_when_there_is_nothing_to_do() {
    let h = Harness::new(ScriptedGateway::slow(Duration::from_millis(100)));

    assert_eq!(
        h.queue.sync_batch().await.skipped,
        Some(BatchSkipReason::NothingPending)
    );

    h.enqueue_offline(chrono::Duration::minutes(1)).await;
    let (first, second) = tokio::join!(h.queue.sync_batch(), h.queue.sync_batch());
    assert_eq!(first.synced_count, 1);
    assert_eq!(second.skipped, Some(BatchSkipReason::AlreadySyncing));
    assert!(!h.queue.is_syncing());

    h.queue.monitor().set_online_status(false);
    assert_eq!(
        h.queue.sync_batch().await.skipped,
        Some(BatchSkipReason::Offline)
    );
}

#[tokio::test(start_paused = true)]
async fn batch_honours_size_and_strategy() {
    let h = Harness::with_settings(
        ScriptedGateway::ok(),
        settings(3, 2, SyncStrategy::Lifo),
    );
    let oldest = h.enqueue_offline(chrono::Duration::hours(3)).await;
    h.enqueue_offline(chrono::Duration::hours(2)).await;
    h.enqueue_offline(chrono::Duration::hours(1)).await;

    let result = h.queue.sync_batch().await;

    assert_eq!(result.synced_count, 2);
    let calls = h.gateway.calls();
    assert!(calls[0].captured_at > calls[1].captured_at);
    let pending = h.queue.pending_records().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id(), &oldest);
}

#[tokio::test(start_paused = true)]
async fn batch_stops_when_connection_drops() {
    let h = Harness::new(ScriptedGateway::ok());
    h.enqueue_offline(chrono::Duration::hours(2)).await;
    h.enqueue_offline(chrono::Duration::hours(1)).await;

    let queue = h.queue.clone();
    let batch = tokio::spawn(async move { queue.sync_batch().await });
    settle().await;
    // First item is done, the batch now waits out the item delay.
    h.queue.monitor().set_online_status(false);

    let result = batch.await.unwrap();
    assert_eq!(result.synced_count, 1);
    assert_eq!(h.queue.pending_records().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn recurring_sync_runs_until_stopped() {
    let h = Harness::new(ScriptedGateway::ok());
    h.enqueue_offline(chrono::Duration::minutes(5)).await;

    assert!(h.queue.start().await);
    assert!(h.queue.is_running());

    tokio::time::sleep(Duration::from_secs(29)).await;
    settle().await;
    assert!(h.gateway.calls().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 1);

    h.queue.stop();
    assert!(!h.queue.is_running());
    h.enqueue_offline(chrono::Duration::minutes(1)).await;
    tokio::time::sleep(Duration::from_secs(90)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_is_a_no_op_with_auto_sync_disabled() {
    let settings = SyncSettings::new(false, Duration::from_secs(30), 3, 10, SyncStrategy::Fifo);
    let h = Harness::with_settings(ScriptedGateway::ok(), settings);

    assert!(!h.queue.start().await);
    assert!(!h.queue.is_running());

    h.queue.set_auto_sync_enabled(true).await;
    assert!(h.queue.is_running());
    h.queue.set_auto_sync_enabled(false).await;
    assert!(!h.queue.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_scheduled_retries() {
    let h = Harness::new(ScriptedGateway::failing(transport_error()));
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;
    h.queue.sync_one(&id).await;

    h.queue.stop();
    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;

    assert_eq!(h.gateway.calls().len(), 1);
    assert_eq!(h.queue.pending_records().await[0].retry_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failures_after_stop_wait_for_the_next_start() {
    let h = Harness::with_settings(
        ScriptedGateway::failing(transport_error()),
        settings(5, 10, SyncStrategy::Fifo),
    );
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;
    h.queue.stop();

    let outcome = h.queue.sync_one(&id).await;
    assert!(matches!(
        outcome,
        SyncOneOutcome::RetryDeferred { retry_count: 1, .. }
    ));
    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 1);
    assert_eq!(h.queue.pending_records().await.len(), 1);

    h.queue.start().await;
    let outcome = h.queue.sync_one(&id).await;
    assert!(matches!(
        outcome,
        SyncOneOutcome::RetryScheduled { retry_count: 2, delay, .. } if delay == Duration::from_secs(2)
    ));
    tokio::time::sleep(Duration::from_millis(2_001)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn batch_leaves_backed_off_records_alone() {
    let h = Harness::with_settings(
        ScriptedGateway::failing(transport_error()),
        settings(5, 10, SyncStrategy::Fifo),
    );
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;

    assert_eq!(h.queue.sync_batch().await.failed_count, 1);
    for _ in 0..2 {
        let again = h.queue.sync_batch().await;
        assert_eq!(again.failed_count, 0);
        assert_eq!(again.synced_count, 0);
    }
    assert_eq!(h.gateway.calls().len(), 1);
    assert_eq!(h.queue.pending_records().await[0].retry_count(), 1);

    // The timer still fires on schedule and re-arms with a longer wait.
    tokio::time::sleep(Duration::from_millis(1_001)).await;
    settle().await;
    assert_eq!(h.gateway.calls().len(), 2);
    assert_eq!(h.queue.sync_batch().await.failed_count, 0);
    assert_eq!(h.gateway.calls().len(), 2);
    assert_eq!(h.queue.pending_records().await[0].retry_count(), 2);
    assert_eq!(h.queue.pending_records().await[0].id(), &id);
}

#[tokio::test(start_paused = true)]
async fn poor_connection_widens_item_delay() {
    let h = Harness::with_health(
        ScriptedGateway::ok(),
        SyncSettings::default(),
        Arc::new(LaggingHealth(Duration::from_millis(600))),
    );
    h.enqueue_offline(chrono::Duration::hours(2)).await;
    h.enqueue_offline(chrono::Duration::hours(1)).await;
    assert_eq!(
        h.queue.monitor().test_connection().await,
        ConnectionQuality::Poor
    );

    let result = h.queue.sync_batch().await;

    assert_eq!(result.synced_count, 2);
    assert_eq!(h.gateway.gaps(), vec![Duration::from_millis(500)]);
}

#[tokio::test(start_paused = true)]
async fn good_connection_keeps_the_short_item_delay() {
    let h = Harness::with_health(
        ScriptedGateway::ok(),
        SyncSettings::default(),
        Arc::new(LaggingHealth(Duration::from_millis(150))),
    );
    h.enqueue_offline(chrono::Duration::hours(2)).await;
    h.enqueue_offline(chrono::Duration::hours(1)).await;
    assert_eq!(
        h.queue.monitor().test_connection().await,
        ConnectionQuality::Good
    );

    let result = h.queue.sync_batch().await;

    assert_eq!(result.synced_count, 2);
    assert_eq!(h.gateway.gaps(), vec![Duration::from_millis(100)]);
}

#[tokio::test(start_paused = true)]
async fn lowering_max_retries_dead_letters_exhausted_records() {
    let h = Harness::with_settings(
        ScriptedGateway::failing(transport_error()),
        settings(5, 10, SyncStrategy::Fifo),
    );
    let id = h.enqueue_offline(chrono::Duration::minutes(1)).await;
    h.queue.sync_one(&id).await;
    h.queue.sync_one(&id).await;
    assert_eq!(h.queue.pending_records().await[0].retry_count(), 2);

    h.queue.set_max_retries(2).await;

    assert!(h.queue.pending_records().await.is_empty());
    let dead = h.queue.dead_lettered_records().await;
    assert_eq!(dead[0].reason, DeadLetterReason::RetryBudgetExhausted);
    assert_eq!(h.queue.settings().await.max_retries(), 2);
}

#[tokio::test(start_paused = true)]
async fn snapshot_restores_into_a_fresh_queue() {
    let h = Harness::with_settings(
        ScriptedGateway::failing(GatewayError::Rejected {
            status: 400,
            message: "bad session".into(),
        }),
        settings(4, 5, SyncStrategy::Priority),
    );
    let dead_id = h.enqueue_offline(chrono::Duration::minutes(10)).await;
    h.queue.sync_one(&dead_id).await;
    let pending_id = h.enqueue_offline(chrono::Duration::minutes(1)).await;

    let mut snapshot = h.queue.snapshot().await;
    assert_eq!(snapshot.pending.len(), 1);
    assert_eq!(snapshot.dead_lettered.len(), 1);
    // A record present in both sets stays dead-lettered.
    snapshot
        .pending
        .push(snapshot.dead_lettered[0].record.clone());

    let fresh = Harness::new(ScriptedGateway::ok());
    fresh.queue.restore(snapshot.clone()).await;

    let pending = fresh.queue.pending_records().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id(), &pending_id);
    assert_eq!(fresh.queue.dead_lettered_records().await[0].id(), &dead_id);
    assert_eq!(fresh.queue.settings().await, snapshot.settings);
    assert_eq!(fresh.queue.metrics().await.total_failed, 1);
}

#[tokio::test(start_paused = true)]
async fn diagnostics_leave_out_qr_payloads() {
    let h = Harness::new(ScriptedGateway::ok());
    h.enqueue_offline(chrono::Duration::minutes(1)).await;
    h.queue.monitor().set_online_status(false);

    let report = h.queue.export_diagnostics().await;
    assert_eq!(report.status.pending_count, 1);
    assert!(!report.status.is_online);
    assert_eq!(report.pending[0].student_uuid, "U1");

    let json = report.to_json_pretty().unwrap();
    assert!(json.contains("\"pendingCount\": 1"));
    assert!(!json.contains("studentId"));
}
