use super::state::{StubFailure, StubState};
use crate::domain_model::*;
use crate::logger::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

fn reply_ok<T: Serialize>(data: T) -> Response {
    warp::reply::json(&ApiEnvelope::ok(data)).into_response()
}

fn reply_failure(failure: StubFailure) -> Response {
    let status = StatusCode::from_u16(failure.status).unwrap_or(StatusCode::BAD_REQUEST);
    warp::reply::with_status(
        warp::reply::json(&ApiEnvelope::<()>::err(failure.message)),
        status,
    )
    .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    user: UserProfile,
}

impl SessionResponse {
    fn new(credentials: SessionCredentials, user: UserProfile) -> Self {
        Self {
            access_token: credentials.access_token,
            refresh_token: credentials.refresh_token,
            user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    Ok(match state.login(&body.email, &body.password) {
        Ok((credentials, user)) => reply_ok(SessionResponse::new(credentials, user)),
        Err(failure) => reply_failure(failure),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

pub async fn register(
    body: RegisterRequest,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    Ok(
        match state.register(&body.email, &body.password, &body.display_name, body.role) {
            Ok((credentials, user)) => reply_ok(SessionResponse::new(credentials, user)),
            Err(failure) => reply_failure(failure),
        },
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Answers with the bare `{ accessToken, refreshToken }` shape, not the envelope.
pub async fn refresh(
    body: RefreshRequest,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    let delay = state.record_refresh_call();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    Ok(match state.refresh(&body.refresh_token) {
        Ok(credentials) => {
            debug!("stub issued refreshed tokens");
            warp::reply::json(&credentials).into_response()
        }
        Err(failure) => reply_failure(failure),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

pub async fn logout(
    body: LogoutRequest,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    state.logout(body.refresh_token.as_deref());
    Ok(reply_ok(()))
}

pub async fn me(
    authorization: Option<String>,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    Ok(match state.authenticate("/auth/me", authorization.as_deref()) {
        Ok(user) => reply_ok(user),
        Err(failure) => reply_failure(failure),
    })
}

pub async fn list_favorites(
    authorization: Option<String>,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    Ok(match state.authenticate("/favorites", authorization.as_deref()) {
        Ok(user) => reply_ok(state.list_favorites(&user.email)),
        Err(failure) => reply_failure(failure),
    })
}

pub async fn add_favorite(
    body: FavoriteTarget,
    authorization: Option<String>,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    Ok(match state.authenticate("/favorites", authorization.as_deref()) {
        Ok(user) => reply_ok(state.add_favorite(&user.email, body)),
        Err(failure) => reply_failure(failure),
    })
}

pub async fn remove_favorite(
    kind: String,
    id: String,
    authorization: Option<String>,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    let path = format!("/favorites/{kind}/{id}");
    let user = match state.authenticate(&path, authorization.as_deref()) {
        Ok(user) => user,
        Err(failure) => return Ok(reply_failure(failure)),
    };
    let Ok(kind) = kind.parse::<FavoriteKind>() else {
        return Ok(reply_failure(StubFailure {
            status: 400,
            message: format!("type de favori inconnu: {kind}"),
        }));
    };
    let target = FavoriteTarget::new(kind, id);
    Ok(if state.remove_favorite(&user.email, &target) {
        reply_ok(())
    } else {
        reply_failure(StubFailure {
            status: 404,
            message: "favori introuvable".to_string(),
        })
    })
}

pub async fn partner_establishments(
    authorization: Option<String>,
    state: Arc<StubState>,
) -> Result<Response, warp::Rejection> {
    let user = match state.authenticate("/partner/establishments", authorization.as_deref()) {
        Ok(user) => user,
        Err(failure) => return Ok(reply_failure(failure)),
    };
    let failure = match (user.role, user.status) {
        (Role::Admin, _) | (Role::Partner, Some(AccountStatus::Active)) => None,
        (Role::Partner, Some(AccountStatus::Pending)) => Some("compte en attente de validation"),
        (Role::Partner, _) => Some("compte partenaire inactif"),
        (Role::User, _) => Some("accès réservé aux partenaires"),
    };
    Ok(match failure {
        None => reply_ok(Vec::<serde_json::Value>::new()),
        Some(message) => reply_failure(StubFailure {
            status: 403,
            message: message.to_string(),
        }),
    })
}
