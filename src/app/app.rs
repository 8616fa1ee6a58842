use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_store::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

pub struct App {
    pub api: ApiClient,
    pub token_store: Arc<dyn TokenStore>,
    pub auth_service: Arc<dyn AuthService>,
    pub favorite_service: Arc<dyn FavoriteService>,
}

impl App {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let token_store: Arc<dyn TokenStore> = match settings.token_store.backend.as_str() {
            "memory" => Arc::new(MemoryTokenStore::new()),
            "file" => Arc::new(FileTokenStore::new(&settings.token_store.path)),
            other => return Err(anyhow::anyhow!("Unknown token store backend: {}", other)),
        };
        Self::with_store(settings, token_store)
    }

    pub fn with_store(
        settings: &Settings,
        token_store: Arc<dyn TokenStore>,
    ) -> anyhow::Result<Self> {
        let mut config = ApiClientConfig::new(settings.api.base_url.clone());
        config.timeout = Duration::from_secs(settings.api.timeout_secs);
        if let Some(user_agent) = &settings.api.user_agent {
            config.user_agent = user_agent.clone();
        }
        config.pending_approval_markers = settings.auth.pending_approval_markers.clone();

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let refresh_endpoint = join_url(&config.base_url, &settings.auth.refresh_path)?;
        debug!(%refresh_endpoint, "token refresh endpoint");
        let refresher: Arc<dyn TokenRefresher> =
            Arc::new(HttpTokenRefresher::new(http.clone(), refresh_endpoint));

        let api = ApiClient::with_http_client(http, config, token_store.clone(), refresher);
        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(api.clone()));
        let favorite_service: Arc<dyn FavoriteService> =
            Arc::new(RealFavoriteService::new(api.clone()));

        Ok(Self {
            api,
            token_store,
            auth_service,
            favorite_service,
        })
    }
}
