use crate::domain_model::*;

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    async fn access_token(&self) -> Result<Option<AccessToken>, TokenStoreError>;
    async fn refresh_token(&self) -> Result<Option<RefreshToken>, TokenStoreError>;
    async fn set_access_token(&self, token: AccessToken) -> Result<(), TokenStoreError>;
    async fn set_credentials(&self, credentials: SessionCredentials)
    -> Result<(), TokenStoreError>;
    async fn clear_all(&self) -> Result<(), TokenStoreError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenStoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("corrupt credentials file: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for TokenStoreError {
    fn from(error: std::io::Error) -> Self {
        TokenStoreError::Io(error.to_string())
    }
}
