use super::attendance_record::OfflineAttendanceRecord;
use crate::domain::value_objects::{QrPayload, SessionId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A scan as handed over by the capture screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCapture {
    pub qr_payload: String,
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
    /// Student the scanner resolved; must agree with the QR payload when present.
    #[serde(default)]
    pub student_uuid: Option<String>,
}

/// A capture that passed every rule and can become a queue record.
#[derive(Debug, Clone)]
pub struct ValidatedCapture {
    pub qr_payload: String,
    pub session_id: SessionId,
    pub student_uuid: String,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("malformed QR payload: {0}")]
    MalformedQrPayload(String),
    #[error("capture timestamp {0} is in the future")]
    CapturedInFuture(DateTime<Utc>),
    #[error("capture from {captured_at} is older than {max_age_hours}h")]
    Expired {
        captured_at: DateTime<Utc>,
        max_age_hours: i64,
    },
    #[error("session id is required")]
    MissingSessionId,
    #[error("student {supplied} does not match QR payload student {decoded}")]
    StudentMismatch { supplied: String, decoded: String },
}

impl ValidationIssue {
    pub fn is_expiry(&self) -> bool {
        matches!(self, ValidationIssue::Expired { .. })
    }
}

/// Every rule a capture broke, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureValidationError {
    issues: Vec<ValidationIssue>,
}

impl CaptureValidationError {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_expired(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_expiry)
    }
}

impl fmt::Display for CaptureValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid attendance capture: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CaptureValidationError {}

#[derive(Debug, Clone, Copy)]
pub struct CaptureValidator {
    max_age: Duration,
}

impl CaptureValidator {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn validate(
        &self,
        capture: &AttendanceCapture,
        now: DateTime<Utc>,
    ) -> Result<ValidatedCapture, CaptureValidationError> {
        let mut issues = Vec::new();

        let decoded = match QrPayload::decode(&capture.qr_payload) {
            Ok(payload) => Some(payload),
            Err(reason) => {
                issues.push(ValidationIssue::MalformedQrPayload(reason));
                None
            }
        };

        self.check_timestamp(capture.captured_at, now, &mut issues);

        let session_id = match SessionId::new(capture.session_id.clone()) {
            Ok(id) => Some(id),
            Err(_) => {
                issues.push(ValidationIssue::MissingSessionId);
                None
            }
        };

        if let (Some(payload), Some(supplied)) = (&decoded, &capture.student_uuid) {
            if supplied.trim() != payload.uuid {
                issues.push(ValidationIssue::StudentMismatch {
                    supplied: supplied.clone(),
                    decoded: payload.uuid.clone(),
                });
            }
        }

        match (decoded, session_id) {
            (Some(payload), Some(session_id)) if issues.is_empty() => Ok(ValidatedCapture {
                qr_payload: capture.qr_payload.clone(),
                session_id,
                student_uuid: payload.uuid,
                captured_at: capture.captured_at,
            }),
            _ => Err(CaptureValidationError { issues }),
        }
    }

    /// Checks a queued record again right before it is sent.
    pub fn revalidate(
        &self,
        record: &OfflineAttendanceRecord,
        now: DateTime<Utc>,
    ) -> Result<(), CaptureValidationError> {
        let mut issues = Vec::new();
        if let Err(reason) = QrPayload::decode(record.qr_payload()) {
            issues.push(ValidationIssue::MalformedQrPayload(reason));
        }
        self.check_timestamp(record.captured_at(), now, &mut issues);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(CaptureValidationError { issues })
        }
    }

    pub fn is_expired(&self, captured_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(captured_at) > self.max_age
    }

    fn check_timestamp(
        &self,
        captured_at: DateTime<Utc>,
        now: DateTime<Utc>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if captured_at > now {
            issues.push(ValidationIssue::CapturedInFuture(captured_at));
        } else if self.is_expired(captured_at, now) {
            issues.push(ValidationIssue::Expired {
                captured_at,
                max_age_hours: self.max_age.num_hours(),
            });
        }
    }
}

impl Default for CaptureValidator {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}
