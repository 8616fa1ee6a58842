mod error;
mod handler;
mod router;
mod state;

pub use error::recover_error;
pub use router::routes;
pub use state::*;

use crate::logger::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use warp::Filter;

pub struct StubBackend {
    address: SocketAddr,
    state: Arc<StubState>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StubBackend {
    pub fn start(address: SocketAddr, state: Arc<StubState>) -> anyhow::Result<Self> {
        let api = warp::path("api")
            .and(routes(state.clone()))
            .recover(recover_error);

        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let (address, server) = warp::serve(api)
            .try_bind_with_graceful_shutdown(address, async move {
                shutdown.cancelled().await;
            })?;
        let handle = tokio::spawn(server);
        info!(%address, "stub backend listening");

        Ok(Self {
            address,
            state,
            cancel,
            handle,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.address)
    }

    pub fn state(&self) -> &Arc<StubState> {
        &self.state
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            error!("stub backend task failed: {}", e);
        }
        info!("stub backend stopped");
    }
}
