use super::validation::ValidatedCapture;
use crate::domain::value_objects::{AttendanceRecordId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A captured scan waiting for the server to confirm it.
///
/// Only the attempt bookkeeping (`retry_count`, `last_attempt_at`,
/// `last_error`) changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineAttendanceRecord {
    id: AttendanceRecordId,
    qr_payload: String,
    session_id: SessionId,
    student_uuid: String,
    captured_at: DateTime<Utc>,
    retry_count: u32,
    last_attempt_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl OfflineAttendanceRecord {
    pub fn new(id: AttendanceRecordId, capture: ValidatedCapture) -> Self {
        Self {
            id,
            qr_payload: capture.qr_payload,
            session_id: capture.session_id,
            student_uuid: capture.student_uuid,
            captured_at: capture.captured_at,
            retry_count: 0,
            last_attempt_at: None,
            last_error: None,
        }
    }

    /// Rebuilds a record from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: AttendanceRecordId,
        qr_payload: String,
        session_id: SessionId,
        student_uuid: String,
        captured_at: DateTime<Utc>,
        retry_count: u32,
        last_attempt_at: Option<DateTime<Utc>>,
        last_error: Option<String>,
    ) -> Self {
        Self {
            id,
            qr_payload,
            session_id,
            student_uuid,
            captured_at,
            retry_count,
            last_attempt_at,
            last_error,
        }
    }

    pub fn id(&self) -> &AttendanceRecordId {
        &self.id
    }

    pub fn qr_payload(&self) -> &str {
        &self.qr_payload
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn student_uuid(&self) -> &str {
        &self.student_uuid
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn mark_attempt(&mut self, at: DateTime<Utc>) {
        self.last_attempt_at = Some(at);
    }

    /// Books a failed attempt and returns the new retry count.
    pub fn record_failure(&mut self, message: impl Into<String>) -> u32 {
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(message.into());
        self.retry_count
    }

    pub fn reset_retries(&mut self) {
        self.retry_count = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterReason {
    RetryBudgetExhausted,
    PermanentFailure,
    Expired,
    Invalid,
}

impl DeadLetterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadLetterReason::RetryBudgetExhausted => "retry_budget_exhausted",
            DeadLetterReason::PermanentFailure => "permanent_failure",
            DeadLetterReason::Expired => "expired",
            DeadLetterReason::Invalid => "invalid",
        }
    }
}

impl fmt::Display for DeadLetterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeadLetterReason {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "retry_budget_exhausted" => Ok(DeadLetterReason::RetryBudgetExhausted),
            "permanent_failure" => Ok(DeadLetterReason::PermanentFailure),
            "expired" => Ok(DeadLetterReason::Expired),
            "invalid" => Ok(DeadLetterReason::Invalid),
            other => Err(format!("Unknown dead letter reason: {other}")),
        }
    }
}

/// A record that is no longer retried automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetteredRecord {
    pub record: OfflineAttendanceRecord,
    pub reason: DeadLetterReason,
    pub dead_lettered_at: DateTime<Utc>,
}

impl DeadLetteredRecord {
    pub fn new(
        record: OfflineAttendanceRecord,
        reason: DeadLetterReason,
        dead_lettered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record,
            reason,
            dead_lettered_at,
        }
    }

    pub fn id(&self) -> &AttendanceRecordId {
        self.record.id()
    }
}
