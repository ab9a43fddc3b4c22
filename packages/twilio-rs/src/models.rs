use serde::Deserialize;

/// Message resource returned by `POST /Messages.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl MessageResponse {
    pub fn is_rejected(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "undelivered")
    }
}

/// Error payload Twilio sends with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best-effort human readable message from a raw error body.
    pub fn describe(raw: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(raw) {
            Ok(ApiErrorBody {
                code: Some(code),
                message: Some(message),
            }) => format!("{} (code {})", message, code),
            Ok(ApiErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => raw.to_string(),
        }
    }
}
