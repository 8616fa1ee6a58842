use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    Message(String),
    Detailed {
        #[serde(default)]
        code: Option<String>,
        message: String,
    },
}

impl ApiErrorBody {
    pub fn message(&self) -> &str {
        match self {
            ApiErrorBody::Message(message) => message,
            ApiErrorBody::Detailed { message, .. } => message,
        }
    }
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        ApiEnvelope {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ApiEnvelope {
            success: false,
            data: None,
            error: Some(ApiErrorBody::Message(message.into())),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(ApiErrorBody::message)
    }
}

/// Best-effort extraction of a human readable error from an error response body.
pub fn error_message_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => {
            let from_error = value.get("error").and_then(|error| match error {
                serde_json::Value::String(message) => Some(message.clone()),
                serde_json::Value::Object(object) => object
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned),
                _ => None,
            });
            from_error.or_else(|| {
                value
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() || text.len() > 512 {
                None
            } else {
                Some(text)
            }
        }
    }
}
