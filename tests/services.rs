mod common;

use common::*;
use discover_haiti::app::App;
use discover_haiti::application_port::*;
use discover_haiti::domain_model::*;
use discover_haiti::domain_port::*;
use discover_haiti::infra_store::MemoryTokenStore;
use discover_haiti::settings::parse_settings;
use discover_haiti::stub_backend::*;
use std::sync::Arc;

fn app_for(backend: &StubBackend) -> App {
    let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
    settings.api.base_url = backend.base_url();
    App::with_store(&settings, Arc::new(MemoryTokenStore::new())).unwrap()
}

fn start_backend() -> StubBackend {
    StubBackend::start(
        ([127, 0, 0, 1], 0).into(),
        Arc::new(StubState::with_demo_accounts()),
    )
    .unwrap()
}

#[tokio::test]
async fn login_stores_the_issued_session() {
    let backend = start_backend();
    let app = app_for(&backend);

    let result = app
        .auth_service
        .login(LoginInput {
            email: TOURIST.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.user.email, TOURIST);
    assert_eq!(result.user.role, Role::User);
    assert!(app.auth_service.is_authenticated().await.unwrap());
    assert_eq!(
        app.token_store.access_token().await.unwrap(),
        Some(result.credentials.access_token.clone())
    );
    assert_eq!(
        app.token_store.refresh_token().await.unwrap(),
        Some(result.credentials.refresh_token.clone())
    );

    let me = app.auth_service.current_user().await.unwrap();
    assert_eq!(me.id, result.user.id);

    backend.shutdown().await;
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let backend = start_backend();
    let app = app_for(&backend);

    let err = app
        .auth_service
        .login(LoginInput {
            email: TOURIST.to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!app.auth_service.is_authenticated().await.unwrap());
    assert_eq!(backend.state().refresh_calls(), 0);

    backend.shutdown().await;
}

#[tokio::test]
async fn registering_a_partner_leaves_it_pending() {
    let backend = start_backend();
    let app = app_for(&backend);

    let result = app
        .auth_service
        .register(RegisterInput {
            email: "hotel@example.ht".to_string(),
            password: "secret".to_string(),
            display_name: "Hôtel Oloffson".to_string(),
            role: Role::Partner,
        })
        .await
        .unwrap();
    assert!(result.user.is_pending_partner());

    let err = app
        .api
        .get::<serde_json::Value>("/partner/establishments")
        .await
        .unwrap_err();
    assert!(err.is_pending_approval());

    backend.shutdown().await;
}

#[tokio::test]
async fn duplicate_registration_is_reported() {
    let backend = start_backend();
    let app = app_for(&backend);

    let err = app
        .auth_service
        .register(RegisterInput {
            email: TOURIST.to_string(),
            password: PASSWORD.to_string(),
            display_name: "Again".to_string(),
            role: Role::User,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::AlreadyRegistered));

    backend.shutdown().await;
}

#[tokio::test]
async fn logout_revokes_the_refresh_token_and_clears_the_store() {
    let backend = start_backend();
    let app = app_for(&backend);
    let session = app
        .auth_service
        .login(LoginInput {
            email: TOURIST.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    app.auth_service.logout().await.unwrap();

    assert!(!app.auth_service.is_authenticated().await.unwrap());
    assert!(app.token_store.refresh_token().await.unwrap().is_none());

    // The revoked refresh token can no longer renew a session.
    let replayed = MemoryTokenStore::with_credentials(session.credentials);
    let stale = client(&backend.base_url(), Arc::new(replayed));
    backend.state().expire_access_tokens();
    let err = stale.get::<serde_json::Value>("/favorites").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::RefreshFailed(RefreshFailure::Rejected { status: 401, .. })
    ));

    backend.shutdown().await;
}

#[tokio::test]
async fn logout_clears_credentials_even_when_the_backend_is_gone() {
    let backend = start_backend();
    let app = app_for(&backend);
    let credentials = backend.state().issue_session(TOURIST).unwrap();
    app.token_store.set_credentials(credentials).await.unwrap();
    backend.shutdown().await;

    app.auth_service.logout().await.unwrap();

    assert!(!app.auth_service.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn favorites_round_trip() {
    let backend = start_backend();
    let app = app_for(&backend);
    let credentials = backend.state().issue_session(TOURIST).unwrap();
    app.token_store.set_credentials(credentials).await.unwrap();

    let citadelle = FavoriteTarget::new(FavoriteKind::Site, "citadelle-laferriere");
    let added = app.favorite_service.add(&citadelle).await.unwrap();
    assert_eq!(added.target, citadelle);
    assert!(added.created_at.is_some());

    let listed = app.favorite_service.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(backend.state().favorites_of(TOURIST).len(), 1);

    let now_favorite = app
        .favorite_service
        .toggle(&citadelle, true)
        .await
        .unwrap();
    assert!(!now_favorite);
    assert!(app.favorite_service.list().await.unwrap().is_empty());

    let now_favorite = app
        .favorite_service
        .toggle(&citadelle, false)
        .await
        .unwrap();
    assert!(now_favorite);

    let missing = FavoriteTarget::new(FavoriteKind::Event, "kanaval");
    let err = app.favorite_service.remove(&missing).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    backend.shutdown().await;
}

#[tokio::test]
async fn favorite_ids_with_slashes_are_refused_locally() {
    let backend = start_backend();
    let app = app_for(&backend);

    let target = FavoriteTarget::new(FavoriteKind::Establishment, "a/b");
    let err = app.favorite_service.remove(&target).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidRequest(_)));
    assert!(backend.state().authorization_log().is_empty());

    backend.shutdown().await;
}
