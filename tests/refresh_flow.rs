mod common;

use common::*;
use discover_haiti::application_port::*;
use discover_haiti::domain_model::*;
use discover_haiti::domain_port::*;
use discover_haiti::infra_store::FileTokenStore;
use discover_haiti::stub_backend::RefreshBehavior;
use futures_util::future::join_all;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;

async fn get_favorites(harness: &Harness) -> Result<HttpResponse, ClientError> {
    harness
        .api
        .request(Method::GET, "/favorites", None, RequestOptions::default())
        .await
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed() {
    let harness = Harness::start();
    let old = harness.sign_in_as(TOURIST).await;
    harness.state().expire_access_tokens();
    harness.state().set_next_access_token("new123");

    let response = get_favorites(&harness).await.unwrap();

    assert_eq!(response.status, 200);
    let favorites: Vec<Favorite> = response.envelope().unwrap();
    assert!(favorites.is_empty());
    assert_eq!(harness.state().refresh_calls(), 1);
    assert_eq!(
        harness.store.access_token().await.unwrap(),
        Some(AccessToken("new123".to_string()))
    );
    assert_eq!(
        harness.authorizations(),
        vec![
            Some(format!("Bearer {}", old.access_token.as_str())),
            Some("Bearer new123".to_string()),
        ]
    );
    // The stub rotates refresh tokens and the rotated one is kept.
    let refresh_token = harness.store.refresh_token().await.unwrap().unwrap();
    assert_ne!(refresh_token, old.refresh_token);

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let harness = Harness::start();
    harness.sign_in_as(TOURIST).await;
    harness.state().expire_access_tokens();
    harness.state().set_refresh_delay(Duration::from_millis(300));

    let results = join_all((0..4).map(|_| get_favorites(&harness))).await;

    for result in &results {
        assert_eq!(result.as_ref().unwrap().status, 200);
    }
    assert_eq!(harness.state().refresh_calls(), 1);
    assert!(!harness.api.refresh_gate().is_refreshing());

    let replayed: Vec<_> = harness.authorizations().into_iter().skip(4).collect();
    let current = harness.store.access_token().await.unwrap().unwrap();
    assert_eq!(replayed.len(), 4);
    for authorization in replayed {
        assert_eq!(authorization, Some(format!("Bearer {}", current.as_str())));
    }

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn queued_requests_settle_on_their_own_replayed_outcome() {
    let harness = Harness::start();
    harness.sign_in_as(TOURIST).await;
    harness.state().expire_access_tokens();
    harness.state().set_refresh_delay(Duration::from_millis(300));

    let remove_missing = harness.api.request(
        Method::DELETE,
        "/favorites/site/missing",
        None,
        RequestOptions::default(),
    );
    let (first, removed, last) = tokio::join!(
        get_favorites(&harness),
        remove_missing,
        get_favorites(&harness)
    );

    assert_eq!(first.unwrap().status, 200);
    assert_eq!(removed.unwrap_err().status(), Some(404));
    assert_eq!(last.unwrap().status, 200);
    assert_eq!(harness.state().refresh_calls(), 1);
    assert_eq!(harness.authorizations().len(), 6);

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn rejected_refresh_fails_every_waiter_and_clears_the_session() {
    let harness = Harness::start();
    harness.sign_in_as(TOURIST).await;
    harness.state().expire_access_tokens();
    harness.state().set_refresh_delay(Duration::from_millis(300));
    harness.state().set_refresh_behavior(RefreshBehavior::Reject {
        status: 400,
        message: "refresh token invalide".to_string(),
    });

    let results = join_all((0..3).map(|_| get_favorites(&harness))).await;

    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_terminal_auth());
        assert!(matches!(
            err,
            ClientError::RefreshFailed(RefreshFailure::Rejected { status: 400, ref message })
                if message == "refresh token invalide"
        ));
    }
    assert_eq!(harness.state().refresh_calls(), 1);
    assert!(harness.store.access_token().await.unwrap().is_none());
    assert!(harness.store.refresh_token().await.unwrap().is_none());
    // Only the original attempts reached the backend, none was replayed.
    assert_eq!(harness.authorizations().len(), 3);

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn pending_partner_gets_a_distinct_error_without_refresh() {
    let harness = Harness::start();
    harness.sign_in_as(PARTNER).await;

    let err = harness
        .api
        .request(
            Method::GET,
            "/partner/establishments",
            None,
            RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(err.is_pending_approval());
    assert!(!err.is_terminal_auth());
    assert_eq!(err.status(), Some(403));
    match err {
        ClientError::PendingApproval { message } => {
            assert!(message.contains("en attente de validation"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.state().refresh_calls(), 0);
    assert!(harness.store.access_token().await.unwrap().is_some());

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn other_forbidden_responses_stay_plain_http_errors() {
    let harness = Harness::start();
    harness.sign_in_as(TOURIST).await;

    let err = harness
        .api
        .request(
            Method::GET,
            "/partner/establishments",
            None,
            RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Http { status: 403, .. }));
    assert_eq!(harness.state().refresh_calls(), 0);

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn unauthorized_after_replay_is_terminal() {
    let harness = Harness::start();
    harness.sign_in_as(TOURIST).await;
    harness.state().set_accept_tokens(false);

    let err = get_favorites(&harness).await.unwrap_err();

    assert!(matches!(err, ClientError::Http { status: 401, .. }));
    assert!(err.is_terminal_auth());
    assert_eq!(harness.state().refresh_calls(), 1);
    assert_eq!(harness.authorizations().len(), 2);

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn no_token_means_no_authorization_header_and_no_refresh_call() {
    let harness = Harness::start();

    let err = get_favorites(&harness).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RefreshFailed(RefreshFailure::MissingRefreshToken)
    ));
    assert_eq!(harness.authorizations(), vec![None]);
    assert_eq!(harness.state().refresh_calls(), 0);

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn skip_refresh_returns_the_first_unauthorized() {
    let harness = Harness::start();
    harness.sign_in_as(TOURIST).await;
    harness.state().expire_access_tokens();

    let err = harness
        .api
        .request(
            Method::GET,
            "/favorites",
            None,
            RequestOptions::default().without_refresh(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(harness.state().refresh_calls(), 0);
    assert!(harness.store.access_token().await.unwrap().is_some());

    harness.backend.shutdown().await;
}

#[tokio::test]
async fn refreshed_credentials_are_persisted_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let harness = Harness::start_with_store(Arc::new(FileTokenStore::new(&path)));
    harness.sign_in_as(TOURIST).await;
    harness.state().expire_access_tokens();
    harness.state().set_next_access_token("persisted-access");

    get_favorites(&harness).await.unwrap();

    let reopened = FileTokenStore::new(&path);
    assert_eq!(
        reopened.access_token().await.unwrap(),
        Some(AccessToken("persisted-access".to_string()))
    );

    harness.backend.shutdown().await;
}
