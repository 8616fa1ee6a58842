#![allow(dead_code)]

use discover_haiti::application_impl::*;
use discover_haiti::application_port::join_url;
use discover_haiti::domain_model::*;
use discover_haiti::domain_port::*;
use discover_haiti::infra_http::HttpTokenRefresher;
use discover_haiti::infra_store::MemoryTokenStore;
use discover_haiti::stub_backend::*;
use std::sync::Arc;

pub const TOURIST: &str = "touriste@example.ht";
pub const PARTNER: &str = "partenaire@example.ht";
pub const PASSWORD: &str = "haiti2026";

/// A stub backend on a free port plus a client pointed at it.
pub struct Harness {
    pub backend: StubBackend,
    pub store: Arc<dyn TokenStore>,
    pub api: ApiClient,
}

impl Harness {
    pub fn start() -> Self {
        Self::start_with_store(Arc::new(MemoryTokenStore::new()))
    }

    pub fn start_with_store(store: Arc<dyn TokenStore>) -> Self {
        let state = Arc::new(StubState::with_demo_accounts());
        let backend = StubBackend::start(([127, 0, 0, 1], 0).into(), state).unwrap();
        let api = client(&backend.base_url(), store.clone());
        Self {
            backend,
            store,
            api,
        }
    }

    pub fn state(&self) -> &Arc<StubState> {
        self.backend.state()
    }

    /// Put a freshly issued session for `email` in the client's store.
    pub async fn sign_in_as(&self, email: &str) -> SessionCredentials {
        let credentials = self.state().issue_session(email).unwrap();
        self.store.set_credentials(credentials.clone()).await.unwrap();
        credentials
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state()
            .authorization_log()
            .into_iter()
            .map(|record| record.authorization)
            .collect()
    }
}

pub fn client(base_url: &str, store: Arc<dyn TokenStore>) -> ApiClient {
    let refresher = Arc::new(HttpTokenRefresher::new(
        reqwest::Client::new(),
        join_url(base_url, "/auth/refresh").unwrap(),
    ));
    ApiClient::new(ApiClientConfig::new(base_url), store, refresher).unwrap()
}
