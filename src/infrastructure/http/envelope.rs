use serde::Deserialize;
use serde_json::Value;

/// `{ success, data?, error? }` wrapper every attendance endpoint answers with.
#[derive(Debug, Deserialize)]
pub(super) struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}
