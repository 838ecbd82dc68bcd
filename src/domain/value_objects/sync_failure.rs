use serde::{Deserialize, Serialize};

/// Whether a failed sync attempt is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailureKind {
    Transient,
    Permanent,
}

impl SyncFailureKind {
    /// Kind of a structured rejection (`success: false` envelope) by HTTP status.
    ///
    /// Only a 2xx or a client error is final. Throttling and request timeouts
    /// may clear up on their own, and so may anything outside those classes.
    pub fn for_rejection_status(status: u16) -> Self {
        match status {
            408 | 425 | 429 => SyncFailureKind::Transient,
            200..=299 | 400..=499 => SyncFailureKind::Permanent,
            _ => SyncFailureKind::Transient,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, SyncFailureKind::Transient)
    }
}
