use crate::domain_model::*;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    Rotate,
    Reject { status: u16, message: String },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AuthorizationRecord {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StubFailure {
    pub status: u16,
    pub message: String,
}

impl StubFailure {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

struct StubAccount {
    password: String,
    profile: UserProfile,
}

struct StubInner {
    accounts: HashMap<String, StubAccount>,
    access_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
    favorites: HashMap<String, Vec<Favorite>>,
    accept_tokens: bool,
    refresh_behavior: RefreshBehavior,
    refresh_delay: Duration,
    next_access_token: Option<String>,
    authorization_log: Vec<AuthorizationRecord>,
}

pub struct StubState {
    inner: Mutex<StubInner>,
    refresh_calls: AtomicUsize,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new()
    }
}

impl StubState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StubInner {
                accounts: HashMap::new(),
                access_tokens: HashMap::new(),
                refresh_tokens: HashMap::new(),
                favorites: HashMap::new(),
                accept_tokens: true,
                refresh_behavior: RefreshBehavior::Rotate,
                refresh_delay: Duration::ZERO,
                next_access_token: None,
                authorization_log: Vec::new(),
            }),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_demo_accounts() -> Self {
        let state = Self::new();
        state.seed_account("touriste@example.ht", "haiti2026", Role::User, AccountStatus::Active);
        state.seed_account(
            "partenaire@example.ht",
            "haiti2026",
            Role::Partner,
            AccountStatus::Pending,
        );
        state.seed_account("admin@example.ht", "haiti2026", Role::Admin, AccountStatus::Active);
        state
    }

    fn lock(&self) -> MutexGuard<'_, StubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // region test controls

    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
        status: AccountStatus,
    ) -> UserProfile {
        let profile = UserProfile {
            id: UserId(uuid::Uuid::new_v4().to_string()),
            email: email.to_string(),
            display_name: None,
            role,
            status: Some(status),
        };
        self.lock().accounts.insert(
            email.to_string(),
            StubAccount {
                password: password.to_string(),
                profile: profile.clone(),
            },
        );
        profile
    }

    pub fn issue_session(&self, email: &str) -> Option<SessionCredentials> {
        let mut inner = self.lock();
        if !inner.accounts.contains_key(email) {
            return None;
        }
        Some(Self::issue_locked(&mut inner, email))
    }

    /// Invalidate every access token handed out so far. Refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        self.lock().access_tokens.clear();
    }

    /// When false, every authenticated route answers 401 whatever the token.
    pub fn set_accept_tokens(&self, accept: bool) {
        self.lock().accept_tokens = accept;
    }

    pub fn set_refresh_behavior(&self, behavior: RefreshBehavior) {
        self.lock().refresh_behavior = behavior;
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.lock().refresh_delay = delay;
    }

    pub fn set_next_access_token(&self, token: impl Into<String>) {
        self.lock().next_access_token = Some(token.into());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn authorization_log(&self) -> Vec<AuthorizationRecord> {
        self.lock().authorization_log.clone()
    }

    pub fn favorites_of(&self, email: &str) -> Vec<Favorite> {
        self.lock().favorites.get(email).cloned().unwrap_or_default()
    }

    // endregion

    // region request handling

    pub(super) fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionCredentials, UserProfile), StubFailure> {
        let mut inner = self.lock();
        let profile = match inner.accounts.get(email) {
            Some(account) if account.password == password => account.profile.clone(),
            _ => return Err(StubFailure::new(401, "identifiants invalides")),
        };
        if profile.status == Some(AccountStatus::Suspended) {
            return Err(StubFailure::new(403, "compte suspendu"));
        }
        Ok((Self::issue_locked(&mut inner, email), profile))
    }

    pub(super) fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<(SessionCredentials, UserProfile), StubFailure> {
        let mut inner = self.lock();
        if inner.accounts.contains_key(email) {
            return Err(StubFailure::new(409, "email déjà utilisé"));
        }
        let status = match role {
            Role::User => AccountStatus::Active,
            Role::Partner => AccountStatus::Pending,
            Role::Admin => return Err(StubFailure::new(403, "inscription admin interdite")),
        };
        let profile = UserProfile {
            id: UserId(uuid::Uuid::new_v4().to_string()),
            email: email.to_string(),
            display_name: Some(display_name.to_string()),
            role,
            status: Some(status),
        };
        inner.accounts.insert(
            email.to_string(),
            StubAccount {
                password: password.to_string(),
                profile: profile.clone(),
            },
        );
        Ok((Self::issue_locked(&mut inner, email), profile))
    }

    pub(super) fn record_refresh_call(&self) -> Duration {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.lock().refresh_delay
    }

    pub(super) fn refresh(&self, refresh_token: &str) -> Result<SessionCredentials, StubFailure> {
        let mut inner = self.lock();
        if let RefreshBehavior::Reject { status, message } = &inner.refresh_behavior {
            return Err(StubFailure::new(*status, message.clone()));
        }
        let email = inner
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| StubFailure::new(401, "refresh token invalide"))?;
        Ok(Self::issue_locked(&mut inner, &email))
    }

    pub(super) fn logout(&self, refresh_token: Option<&str>) {
        if let Some(token) = refresh_token {
            self.lock().refresh_tokens.remove(token);
        }
    }

    pub(super) fn authenticate(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<UserProfile, StubFailure> {
        let mut inner = self.lock();
        inner.authorization_log.push(AuthorizationRecord {
            path: path.to_string(),
            authorization: authorization.map(str::to_owned),
        });
        if !inner.accept_tokens {
            return Err(StubFailure::new(401, "token invalide"));
        }
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| StubFailure::new(401, "authentification requise"))?;
        let email = inner
            .access_tokens
            .get(token)
            .ok_or_else(|| StubFailure::new(401, "token expiré"))?;
        inner
            .accounts
            .get(email)
            .map(|account| account.profile.clone())
            .ok_or_else(|| StubFailure::new(401, "compte introuvable"))
    }

    pub(super) fn list_favorites(&self, email: &str) -> Vec<Favorite> {
        self.favorites_of(email)
    }

    pub(super) fn add_favorite(&self, email: &str, target: FavoriteTarget) -> Favorite {
        let mut inner = self.lock();
        let favorites = inner.favorites.entry(email.to_string()).or_default();
        if let Some(existing) = favorites.iter().find(|f| f.target == target) {
            return existing.clone();
        }
        let favorite = Favorite {
            target,
            created_at: Some(Utc::now()),
        };
        favorites.push(favorite.clone());
        favorite
    }

    pub(super) fn remove_favorite(&self, email: &str, target: &FavoriteTarget) -> bool {
        let mut inner = self.lock();
        let Some(favorites) = inner.favorites.get_mut(email) else {
            return false;
        };
        let before = favorites.len();
        favorites.retain(|f| &f.target != target);
        favorites.len() != before
    }

    // endregion

    fn issue_locked(inner: &mut StubInner, email: &str) -> SessionCredentials {
        let access = inner
            .next_access_token
            .take()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let refresh = uuid::Uuid::new_v4().to_string();
        inner.access_tokens.insert(access.clone(), email.to_string());
        inner.refresh_tokens.insert(refresh.clone(), email.to_string());
        SessionCredentials::new(access, refresh)
    }
}
