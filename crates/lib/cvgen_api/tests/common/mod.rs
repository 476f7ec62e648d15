//! Shared fixtures for the router tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, Response};
use cvgen_api::config::{ApiConfig, DEFAULT_CHECK_TIMEOUT};
use cvgen_api::services::remote_auth::{HttpAuthAuthority, HttpClientSettings};
use cvgen_api::{ResumeServiceState, UserServiceState, resume_service_router};
use cvgen_core::auth::{TokenCodec, TokenIssuer, TokenPair};
use cvgen_core::models::auth::Identity;
use cvgen_core::resumes::MemoryResumeIndex;
use cvgen_core::users::{MemoryUserRepository, UserRepository};
use url::Url;

pub const SECRET: &str = "test-secret-that-is-long-enough-0123456789";
pub const OTHER_SECRET: &str = "another-secret-that-is-long-enough-98765";

pub fn config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        jwt_secret: SECRET.into(),
        secure_cookies: false,
        auth_service_url: None,
        check_timeout: DEFAULT_CHECK_TIMEOUT,
        strict_delegation: false,
    }
}

pub fn issuer(secret: &str) -> TokenIssuer {
    TokenIssuer::new(TokenCodec::new(secret.as_bytes()))
}

/// Issuer whose access tokens are already expired.
pub fn expired_access_issuer(secret: &str) -> TokenIssuer {
    TokenIssuer::with_ttls(
        TokenCodec::new(secret.as_bytes()),
        chrono::Duration::seconds(-60),
        chrono::Duration::days(7),
    )
}

pub struct UserService {
    pub state: UserServiceState,
    pub repo: Arc<MemoryUserRepository>,
}

impl UserService {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryUserRepository::new());
        let state = UserServiceState::new(config(), repo.clone());
        Self { state, repo }
    }

    pub fn router(&self) -> axum::Router {
        cvgen_api::user_service_router(self.state.clone())
    }

    /// Insert a user directly and return its identity.
    pub async fn add_user(&self, login: &str, roles: &[&str]) -> Identity {
        self.repo
            .create_user(login, "unused-hash", roles.iter().map(|r| r.to_string()).collect())
            .await
            .unwrap()
            .identity()
    }
}

/// Serve the issuing service on an ephemeral port.
pub async fn spawn_user_service(secret: &str) -> (SocketAddr, Arc<MemoryUserRepository>) {
    let repo = Arc::new(MemoryUserRepository::new());
    let mut cfg = config();
    cfg.jwt_secret = secret.into();
    let app = cvgen_api::user_service_router(UserServiceState::new(cfg, repo.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, repo)
}

/// Resume service delegating to the authority at `authority_addr` over HTTP.
pub fn resume_app(authority_addr: SocketAddr, index: Arc<MemoryResumeIndex>) -> axum::Router {
    let url = Url::parse(&format!("http://{authority_addr}")).unwrap();
    let client = HttpClientSettings::with_timeout(Duration::from_secs(2))
        .build_client()
        .unwrap();
    let authority = Arc::new(HttpAuthAuthority::new(client, &url).unwrap());
    let mut cfg = config();
    cfg.auth_service_url = Some(url);
    resume_service_router(ResumeServiceState::new(cfg, index, authority))
}

pub fn cookie_header(access: Option<&str>, refresh: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(a) = access {
        parts.push(format!("Authorization=Bearer {a}"));
    }
    if let Some(r) = refresh {
        parts.push(format!("Refresh-Token={r}"));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

pub fn pair_cookie(pair: &TokenPair) -> Option<String> {
    cookie_header(Some(&pair.access.token), Some(&pair.refresh.token))
}

pub fn request(method: &str, uri: &str, cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    cookie_json_request(method, uri, None, body)
}

pub fn cookie_json_request(
    method: &str,
    uri: &str,
    cookie: Option<String>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn set_cookies<B>(resp: &Response<B>) -> Vec<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Value of the `Set-Cookie` for `name`, without attributes.
pub fn set_cookie_value<B>(resp: &Response<B>, name: &str) -> Option<String> {
    set_cookies(resp).into_iter().find_map(|c| {
        let pair = c.split(';').next()?;
        let (n, v) = pair.split_once('=')?;
        (n == name).then(|| v.to_string())
    })
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(200);

/// Alter one character of the payload segment, leaving the signature as is.
pub fn tamper(token: &str) -> String {
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let first = parts[1].remove(0);
    parts[1].insert(0, if first == 'e' { 'f' } else { 'e' });
    parts.join(".")
}
