use crate::application_impl::ApiClient;
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use reqwest::Method;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    user: UserProfile,
}

pub struct RealAuthService {
    api: ApiClient,
}

impl RealAuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn open_session(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<LoginResult, ClientError> {
        let payload: SessionPayload = self
            .api
            .request(
                Method::POST,
                path,
                Some(body),
                RequestOptions::default().without_refresh(),
            )
            .await?
            .envelope()?;

        let credentials = SessionCredentials {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        };
        self.api
            .token_store()
            .set_credentials(credentials.clone())
            .await?;

        Ok(LoginResult {
            user: payload.user,
            credentials,
        })
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, AuthError> {
    serde_json::to_value(value)
        .map_err(|e| AuthError::Client(ClientError::InvalidRequest(e.to_string())))
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, input: LoginInput) -> Result<LoginResult, AuthError> {
        let body = to_body(&input)?;
        let result = self
            .open_session("/auth/login", body)
            .await
            .map_err(|e| match e {
                ClientError::Http {
                    status: 400 | 401, ..
                } => AuthError::InvalidCredentials,
                other => AuthError::Client(other),
            })?;
        info!(user_id = %result.user.id, role = ?result.user.role, "logged in");
        Ok(result)
    }

    async fn register(&self, input: RegisterInput) -> Result<LoginResult, AuthError> {
        let body = to_body(&input)?;
        let result = self
            .open_session("/auth/register", body)
            .await
            .map_err(|e| match e {
                ClientError::Http { status: 409, .. } => AuthError::AlreadyRegistered,
                other => AuthError::Client(other),
            })?;
        info!(user_id = %result.user.id, role = ?result.user.role, "registered");
        Ok(result)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let store = self.api.token_store();
        let refresh_token = store.refresh_token().await?;
        let body = serde_json::json!({ "refreshToken": refresh_token });

        // Revocation is best effort: local credentials go away regardless.
        if let Err(e) = self
            .api
            .request(
                Method::POST,
                "/auth/logout",
                Some(body),
                RequestOptions::default().without_refresh(),
            )
            .await
        {
            warn!("backend logout failed: {}", e);
        }

        store.clear_all().await?;
        info!("logged out");
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, AuthError> {
        let user = self
            .api
            .request(Method::GET, "/auth/me", None, RequestOptions::default())
            .await?
            .envelope()?;
        Ok(user)
    }

    async fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.api.token_store().access_token().await?.is_some())
    }
}
