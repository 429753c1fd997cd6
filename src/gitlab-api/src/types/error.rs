use serde::{Deserialize, Serialize};

/// Error body returned by GitLab
///
/// GitLab reports failures either as `{"message": ...}` (where the message can
/// be a string or a map of field errors) or as `{"error": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(serde_json::Value::String(message.into())),
            error: None,
        }
    }

    /// Flatten the body into a single line for logs
    pub fn describe(&self) -> Option<String> {
        match (&self.message, &self.error) {
            (Some(serde_json::Value::String(message)), _) => Some(message.clone()),
            (Some(other), _) => Some(other.to_string()),
            (None, Some(error)) => Some(error.clone()),
            (None, None) => None,
        }
    }
}
