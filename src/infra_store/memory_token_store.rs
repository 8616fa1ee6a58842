use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct StoredTokens {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: SessionCredentials) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access_token: Some(credentials.access_token),
                refresh_token: Some(credentials.refresh_token),
            }),
        }
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Result<Option<AccessToken>, TokenStoreError> {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tokens.access_token.clone())
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>, TokenStoreError> {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tokens.refresh_token.clone())
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<(), TokenStoreError> {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.access_token = Some(token);
        Ok(())
    }

    async fn set_credentials(
        &self,
        credentials: SessionCredentials,
    ) -> Result<(), TokenStoreError> {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.access_token = Some(credentials.access_token);
        tokens.refresh_token = Some(credentials.refresh_token);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), TokenStoreError> {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        *tokens = StoredTokens::default();
        Ok(())
    }
}
