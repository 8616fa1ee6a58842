use crate::application_impl::RefreshGate;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub pending_approval_markers: Vec<String>,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            user_agent: format!("discover-haiti/{}", env!("CARGO_PKG_VERSION")),
            pending_approval_markers: vec![
                "en attente de validation".to_string(),
                "pending approval".to_string(),
            ],
        }
    }
}

/// HTTP client for the Discover Haiti API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    pending_approval_markers: Vec<String>,
    store: Arc<dyn TokenStore>,
    gate: Arc<RefreshGate>,
}

impl ApiClient {
    pub fn new(
        config: ApiClientConfig,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        Ok(Self::with_http_client(http, config, store, refresher))
    }

    pub fn with_http_client(
        http: reqwest::Client,
        config: ApiClientConfig,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let gate = Arc::new(RefreshGate::new(store.clone(), refresher));
        let pending_approval_markers = config
            .pending_approval_markers
            .iter()
            .map(|marker| marker.to_lowercase())
            .collect();
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url,
                pending_approval_markers,
                store,
                gate,
            }),
        }
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.store
    }

    pub fn refresh_gate(&self) -> &Arc<RefreshGate> {
        &self.inner.gate
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<HttpResponse, ClientError> {
        let url = join_url(&self.inner.base_url, path)?;
        let body = body
            .map(|value| serde_json::to_vec(&value))
            .transpose()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?
            .map(bytes::Bytes::from);

        let sent_token = self.inner.store.access_token().await?;
        let response = self
            .send_once(&method, &url, body.clone(), &options, sent_token.as_ref())
            .await?;

        if response.status != StatusCode::UNAUTHORIZED.as_u16() || options.skip_refresh {
            return self.finish(response);
        }

        let fresh_token = self.token_for_retry(sent_token.as_ref()).await?;
        debug!(%method, path, "replaying request with refreshed access token");
        let retried = self
            .send_once(&method, &url, body, &options, Some(&fresh_token))
            .await?;
        if retried.status == StatusCode::UNAUTHORIZED.as_u16() {
            warn!(%method, path, "request still unauthorized after token refresh");
        }
        self.finish(retried)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::GET, path, None, RequestOptions::default())
            .await?
            .json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(to_json(body)?), RequestOptions::default())
            .await?
            .json()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(to_json(body)?), RequestOptions::default())
            .await?
            .json()
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(to_json(body)?), RequestOptions::default())
            .await?
            .json()
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::DELETE, path, None, RequestOptions::default())
            .await?
            .json()
    }

    /// Token to replay a 401 with.
    async fn token_for_retry(
        &self,
        sent_token: Option<&AccessToken>,
    ) -> Result<AccessToken, ClientError> {
        if !self.inner.gate.is_refreshing() {
            if let Some(current) = self.inner.store.access_token().await? {
                if sent_token != Some(&current) {
                    return Ok(current);
                }
            }
        }
        Ok(self.inner.gate.renew().await?)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<bytes::Bytes>,
        options: &RequestOptions,
        token: Option<&AccessToken>,
    ) -> Result<HttpResponse, ClientError> {
        let request_id = Uuid::new_v4();
        let mut builder = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .header("X-Request-Id", request_id.to_string());

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| ClientError::Network {
            url: url.to_string(),
            error: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| ClientError::Network {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        debug!(
            %method,
            path = url.path(),
            status,
            %request_id,
            authorized = token.is_some(),
            "api request completed"
        );
        Ok(HttpResponse { status, body })
    }

    fn finish(&self, response: HttpResponse) -> Result<HttpResponse, ClientError> {
        if response.status < 400 {
            return Ok(response);
        }

        let message = error_message_from_body(&response.body).unwrap_or_else(|| {
            StatusCode::from_u16(response.status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });

        if response.status == StatusCode::FORBIDDEN.as_u16() && self.is_pending_approval(&message)
        {
            info!(%message, "account pending approval");
            return Err(ClientError::PendingApproval { message });
        }

        Err(ClientError::Http {
            status: response.status,
            message,
            body: response.body,
        })
    }

    fn is_pending_approval(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.inner
            .pending_approval_markers
            .iter()
            .any(|marker| message.contains(marker.as_str()))
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::InvalidRequest(e.to_string()))
}
