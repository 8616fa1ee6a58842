use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedBody {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefreshResponse {
    Bare(RefreshedBody),
    Enveloped { data: RefreshedBody },
}

pub struct HttpTokenRefresher {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpTokenRefresher {
    pub fn new(http: reqwest::Client, endpoint: reqwest::Url) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait::async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<RefreshedTokens, RefreshFailure> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })
            .send()
            .await
            .map_err(|e| RefreshFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshFailure::Unreachable(e.to_string()))?;

        if !status.is_success() {
            let message = error_message_from_body(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("refresh failed")
                    .to_string()
            });
            warn!(status = status.as_u16(), %message, "token refresh rejected");
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: RefreshResponse = serde_json::from_slice(&body)
            .map_err(|e| RefreshFailure::Malformed(e.to_string()))?;
        let (RefreshResponse::Bare(refreshed) | RefreshResponse::Enveloped { data: refreshed }) =
            parsed;

        Ok(RefreshedTokens {
            access_token: AccessToken(refreshed.access_token),
            refresh_token: refreshed.refresh_token.map(RefreshToken),
        })
    }
}
