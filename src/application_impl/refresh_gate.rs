use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Continuation = oneshot::Sender<Result<AccessToken, RefreshFailure>>;

enum RefreshState {
    Idle,
    Refreshing { queue: Vec<Continuation> },
}

/// Single-flight coordinator for access token renewal.
pub struct RefreshGate {
    state: Mutex<RefreshState>,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
}

impl RefreshGate {
    pub fn new(store: Arc<dyn TokenStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            store,
            refresher,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock_state(), RefreshState::Refreshing { .. })
    }

    pub fn queued(&self) -> usize {
        match &*self.lock_state() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { queue } => queue.len(),
        }
    }

    /// Wait for a fresh access token, starting a refresh only if none is in flight.
    pub async fn renew(self: &Arc<Self>) -> Result<AccessToken, RefreshFailure> {
        let (continuation, outcome) = oneshot::channel();

        // The check and the transition happen under one lock with no await in between.
        let starts_refresh = {
            let mut state = self.lock_state();
            if let RefreshState::Refreshing { queue } = &mut *state {
                queue.push(continuation);
                debug!(queued = queue.len(), "joined in-flight token refresh");
                false
            } else {
                *state = RefreshState::Refreshing {
                    queue: vec![continuation],
                };
                true
            }
        };

        if starts_refresh {
            info!("access token rejected, starting token refresh");
            let gate = Arc::clone(self);
            tokio::spawn(async move { gate.run_refresh().await });
        }

        outcome.await.unwrap_or(Err(RefreshFailure::Abandoned))
    }

    async fn run_refresh(&self) {
        let outcome = self.refresh_once().await;

        if let Err(failure) = &outcome {
            warn!(%failure, "token refresh failed, clearing credentials");
            if let Err(e) = self.store.clear_all().await {
                error!("failed to clear credentials after refresh failure: {}", e);
            }
        }

        let queue = match mem::replace(&mut *self.lock_state(), RefreshState::Idle) {
            RefreshState::Refreshing { queue } => queue,
            RefreshState::Idle => Vec::new(),
        };
        debug!(
            drained = queue.len(),
            success = outcome.is_ok(),
            "token refresh settled"
        );
        for continuation in queue {
            // A receiver that went away no longer cares about the outcome.
            let _ = continuation.send(outcome.clone());
        }
    }

    async fn refresh_once(&self) -> Result<AccessToken, RefreshFailure> {
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .map_err(|e| RefreshFailure::Store(e.to_string()))?
            .ok_or(RefreshFailure::MissingRefreshToken)?;

        let refreshed = self.refresher.refresh(&refresh_token).await?;

        let stored = match refreshed.refresh_token {
            Some(rotated) => {
                self.store
                    .set_credentials(SessionCredentials {
                        access_token: refreshed.access_token.clone(),
                        refresh_token: rotated,
                    })
                    .await
            }
            None => {
                self.store
                    .set_access_token(refreshed.access_token.clone())
                    .await
            }
        };
        stored.map_err(|e| RefreshFailure::Store(e.to_string()))?;

        Ok(refreshed.access_token)
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
