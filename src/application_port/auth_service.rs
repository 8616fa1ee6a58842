use crate::application_port::ClientError;
use crate::domain_model::*;
use crate::domain_port::TokenStoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account already exists for this email")]
    AlreadyRegistered,
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: UserProfile,
    pub credentials: SessionCredentials,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<LoginResult, AuthError>;
    async fn register(&self, input: RegisterInput) -> Result<LoginResult, AuthError>;
    async fn logout(&self) -> Result<(), AuthError>;
    async fn current_user(&self) -> Result<UserProfile, AuthError>;
    async fn is_authenticated(&self) -> Result<bool, AuthError>;
}
