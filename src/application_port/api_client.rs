use crate::domain_model::*;
use crate::domain_port::{RefreshFailure, TokenStoreError};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed with status {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Bytes,
    },
    /// 403 whose message says the account still awaits approval.
    #[error("account pending approval: {message}")]
    PendingApproval { message: String },
    #[error("session refresh failed: {0}")]
    RefreshFailed(#[from] RefreshFailure),
    #[error("network error for {url}: {error}")]
    Network { url: String, error: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("token store error: {0}")]
    Store(#[from] TokenStoreError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::PendingApproval { .. } => Some(403),
            ClientError::RefreshFailed(RefreshFailure::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_terminal_auth(&self) -> bool {
        matches!(
            self,
            ClientError::Http { status: 401, .. } | ClientError::RefreshFailed(_)
        )
    }

    pub fn is_pending_approval(&self) -> bool {
        matches!(self, ClientError::PendingApproval { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Return a 401 as-is instead of running the refresh protocol (login, logout).
    pub skip_refresh: bool,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let body: &[u8] = if self.body.is_empty() {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn envelope<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        self.json::<ApiEnvelope<T>>()?.into_data()
    }

    pub fn acknowledge(&self) -> Result<(), ClientError> {
        if self.body.is_empty() {
            return Ok(());
        }
        self.json::<ApiEnvelope<serde_json::Value>>()?.into_result()?;
        Ok(())
    }
}

impl<T> ApiEnvelope<T> {
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ClientError::Rejected(
                self.error_message()
                    .unwrap_or("request was not successful")
                    .to_string(),
            ))
        }
    }

    pub fn into_data(self) -> Result<T, ClientError> {
        self.into_result()?
            .ok_or_else(|| ClientError::Decode("envelope has no data".to_string()))
    }
}

pub fn join_url(base_url: &str, path: &str) -> Result<reqwest::Url, ClientError> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    reqwest::Url::parse(&joined).map_err(|e| ClientError::InvalidRequest(format!("{joined}: {e}")))
}
