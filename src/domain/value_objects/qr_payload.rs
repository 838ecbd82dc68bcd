use serde::{Deserialize, Serialize};

/// Decoded content of a student attendance QR code.
///
/// Codes are JSON objects carrying at least `uuid` and `studentId`; any other
/// keys written by newer code generators are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub uuid: String,
    pub student_id: String,
}

impl QrPayload {
    pub fn decode(raw: &str) -> Result<Self, String> {
        let payload: QrPayload = serde_json::from_str(raw.trim())
            .map_err(|e| format!("QR payload is not a student code: {e}"))?;

        if payload.uuid.trim().is_empty() {
            return Err("QR payload has an empty uuid".to_string());
        }
        if payload.student_id.trim().is_empty() {
            return Err("QR payload has an empty studentId".to_string());
        }
        Ok(payload)
    }
}
