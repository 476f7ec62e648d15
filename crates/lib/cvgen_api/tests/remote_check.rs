//! Delegating service against a live issuing service over HTTP.

mod common;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use cvgen_api::routes;
use cvgen_core::auth::TokenVerifier;
use cvgen_core::resumes::{MemoryResumeIndex, ResumeIndex};
use tower::ServiceExt;

use common::*;

/// Authority that answers every check with `status` and records the
/// `Cookie` header it was sent.
async fn spawn_stub_authority(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = axum::Router::new()
        .route(
            routes::GET_AUTH_CHECK,
            get(
                move |State(seen): State<Arc<Mutex<Vec<String>>>>, headers: HeaderMap| async move {
                    if let Some(cookie) = headers.get(COOKIE) {
                        seen.lock().unwrap().push(cookie.to_str().unwrap().to_string());
                    }
                    status
                },
            ),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

/// An address nothing listens on.
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[tokio::test]
async fn expired_access_is_refreshed_by_live_authority() {
    let (addr, repo) = spawn_user_service(SECRET).await;
    let who = cvgen_core::users::UserRepository::create_user(
        repo.as_ref(),
        "alice_",
        "unused-hash",
        vec!["user".into()],
    )
    .await
    .unwrap()
    .identity();

    let index = Arc::new(MemoryResumeIndex::new());
    index.add(who.id, "Platform engineer").await.unwrap();
    let app = resume_app(addr, index);

    let pair = expired_access_issuer(SECRET).issue_pair(&who).unwrap();
    let resp = app
        .oneshot(request("GET", routes::GET_USERS_RESUME_LIST, pair_cookie(&pair)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let access = set_cookie_value(&resp, "Authorization").expect("rotated access cookie");
    let identity = TokenVerifier::from_secret(SECRET.as_bytes())
        .verify_access(access.strip_prefix("Bearer ").unwrap())
        .unwrap();
    assert_eq!(identity.id, who.id);
    assert_eq!(identity.roles, vec!["user".to_string()]);
    assert!(set_cookie_value(&resp, "Refresh-Token").is_some());

    let json = body_json(resp).await;
    assert_eq!(json[0]["title"], "Platform engineer");
}

#[tokio::test]
async fn tampered_access_with_unreachable_authority_is_503() {
    let app = resume_app(dead_addr().await, Arc::new(MemoryResumeIndex::new()));
    let who = cvgen_core::models::auth::Identity::new(
        cvgen_core::models::auth::UserId::new(3).unwrap(),
    );
    let pair = issuer(SECRET).issue_pair(&who).unwrap();
    let tampered = tamper(&pair.access.token);
    assert!(
        TokenVerifier::from_secret(SECRET.as_bytes())
            .verify_access(&tampered)
            .is_err()
    );

    let resp = app
        .oneshot(request(
            "GET",
            routes::GET_USERS_RESUME_LIST,
            cookie_header(Some(&tampered), Some(&pair.refresh.token)),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["error"], "upstream_unavailable");
}

#[tokio::test]
async fn authority_rejection_is_401() {
    // The authority signs with a different secret, so it rejects our refresh token.
    let (addr, _repo) = spawn_user_service(OTHER_SECRET).await;
    let app = resume_app(addr, Arc::new(MemoryResumeIndex::new()));
    let who = cvgen_core::models::auth::Identity::new(
        cvgen_core::models::auth::UserId::new(3).unwrap(),
    );
    let refresh = issuer(SECRET).issue_refresh_token(&who).unwrap();

    let resp = app
        .oneshot(request(
            "GET",
            routes::GET_USERS_RESUME_LIST,
            cookie_header(None, Some(&refresh.token)),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_access_with_authority_answering_503_is_503() {
    let (addr, seen) = spawn_stub_authority(StatusCode::SERVICE_UNAVAILABLE).await;
    let app = resume_app(addr, Arc::new(MemoryResumeIndex::new()));
    let who = cvgen_core::models::auth::Identity::new(
        cvgen_core::models::auth::UserId::new(3).unwrap(),
    );
    let pair = issuer(SECRET).issue_pair(&who).unwrap();
    let cookie = cookie_header(Some(&tamper(&pair.access.token)), Some(&pair.refresh.token));

    let resp = app
        .oneshot(request("GET", routes::GET_USERS_RESUME_LIST, cookie.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(body_json(resp).await["error"], "upstream_unavailable");

    // Both cookies reached the authority exactly as the client sent them.
    assert_eq!(*seen.lock().unwrap(), vec![cookie.unwrap()]);
}

#[tokio::test]
async fn gateway_errors_from_authority_are_503() {
    for status in [StatusCode::BAD_GATEWAY, StatusCode::GATEWAY_TIMEOUT] {
        let (addr, _seen) = spawn_stub_authority(status).await;
        let app = resume_app(addr, Arc::new(MemoryResumeIndex::new()));
        let who = cvgen_core::models::auth::Identity::new(
            cvgen_core::models::auth::UserId::new(3).unwrap(),
        );
        let refresh = issuer(SECRET).issue_refresh_token(&who).unwrap();

        let resp = app
            .oneshot(request(
                "GET",
                routes::GET_USERS_RESUME_LIST,
                cookie_header(None, Some(&refresh.token)),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{status}");
    }
}
