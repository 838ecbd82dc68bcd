use crate::domain::entities::OfflineAttendanceRecord;
use crate::domain::value_objects::SyncFailureKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Body of the scan write sent for a queued record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSyncRequest {
    pub qr_payload: String,
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
    pub student_uuid: String,
    pub is_offline_sync: bool,
}

impl From<&OfflineAttendanceRecord> for AttendanceSyncRequest {
    fn from(record: &OfflineAttendanceRecord) -> Self {
        Self {
            qr_payload: record.qr_payload().to_string(),
            session_id: record.session_id().to_string(),
            captured_at: record.captured_at(),
            student_uuid: record.student_uuid().to_string(),
            is_offline_sync: true,
        }
    }
}

/// Server confirmation of a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceAck {
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("connection failed: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The server answered with a `success: false` envelope.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// Non-2xx answer without a readable envelope (proxy pages, gateway errors).
    #[error("server responded with status {status}")]
    HttpStatus { status: u16 },
    #[error("unreadable response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn kind(&self) -> SyncFailureKind {
        match self {
            GatewayError::Rejected { status, .. } => SyncFailureKind::for_rejection_status(*status),
            GatewayError::Transport(_)
            | GatewayError::Timeout(_)
            | GatewayError::HttpStatus { .. }
            | GatewayError::MalformedResponse(_) => SyncFailureKind::Transient,
        }
    }
}

#[async_trait]
pub trait AttendanceGateway: Send + Sync {
    async fn submit_scan(
        &self,
        request: &AttendanceSyncRequest,
    ) -> Result<AttendanceAck, GatewayError>;
}
