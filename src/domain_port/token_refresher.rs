use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub access_token: AccessToken,
    /// Present when the auth endpoint rotates the refresh token.
    pub refresh_token: Option<RefreshToken>,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RefreshFailure {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("auth endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("malformed refresh response: {0}")]
    Malformed(String),
    #[error("token store error: {0}")]
    Store(String),
    #[error("refresh task ended without an outcome")]
    Abandoned,
}

#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &RefreshToken)
    -> Result<RefreshedTokens, RefreshFailure>;
}
