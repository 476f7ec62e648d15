//! # cvgen_api
//!
//! HTTP layer for the resume generator services: the cookie session
//! middleware, account endpoints and both service routers.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use cvgen_core::auth::{TokenCodec, TokenIssuer, TokenVerifier};
use cvgen_core::resumes::ResumeIndex;
use cvgen_core::users::{ADMIN_ROLE, RoleProvider, UserRepository};

use crate::config::ApiConfig;
use crate::handlers::{auth, resumes, users};
use crate::middleware::roles::{RequiredRoles, require_roles};
use crate::middleware::session::{SessionGuard, require_session};
use crate::services::remote_auth::AuthAuthority;

/// State of the issuing (user) service.
#[derive(Clone)]
pub struct UserServiceState {
    pub config: ApiConfig,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleProvider>,
    pub issuer: TokenIssuer,
    pub session: SessionGuard,
}

impl UserServiceState {
    /// Wire a store that is both the user repository and the role source.
    pub fn new<R>(config: ApiConfig, store: Arc<R>) -> Self
    where
        R: UserRepository + RoleProvider + 'static,
    {
        let issuer = TokenIssuer::new(TokenCodec::new(config.jwt_secret.as_bytes()));
        let roles: Arc<dyn RoleProvider> = store.clone();
        let session = SessionGuard::local(issuer.clone(), roles.clone(), config.secure_cookies);
        Self {
            config,
            users: store,
            roles,
            issuer,
            session,
        }
    }
}

/// State of the delegating (resume) service.
#[derive(Clone)]
pub struct ResumeServiceState {
    pub config: ApiConfig,
    pub resumes: Arc<dyn ResumeIndex>,
    pub session: SessionGuard,
}

impl ResumeServiceState {
    pub fn new(
        config: ApiConfig,
        resumes: Arc<dyn ResumeIndex>,
        authority: Arc<dyn AuthAuthority>,
    ) -> Self {
        let session = SessionGuard::delegated(
            TokenVerifier::from_secret(config.jwt_secret.as_bytes()),
            authority,
            config.check_timeout,
            config.strict_delegation,
            config.secure_cookies,
        );
        Self {
            config,
            resumes,
            session,
        }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router of the issuing service.
pub fn user_service_router(state: UserServiceState) -> Router {
    let public = Router::new()
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::GET_AUTH_REFRESH, get(auth::refresh_handler));

    let admin = Router::new()
        .route(routes::GET_ADMIN_USERS_ID, get(users::get_user_handler))
        .layer(axum::middleware::from_fn_with_state(
            RequiredRoles::any_of([ADMIN_ROLE]),
            require_roles,
        ));

    let protected = Router::new()
        .route(routes::GET_AUTH_CHECK, get(auth::check_handler))
        .route(routes::DELETE_AUTH_LOGOUT, delete(auth::logout_handler))
        .route(
            routes::USERS_INFO,
            get(users::info_handler)
                .post(users::create_profile_handler)
                .put(users::update_profile_handler),
        )
        .merge(admin)
        .layer(axum::middleware::from_fn_with_state(
            state.session.clone(),
            require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Router of the delegating service.
pub fn resume_service_router(state: ResumeServiceState) -> Router {
    let protected = Router::new()
        .route(routes::GET_USERS_RESUME_LIST, get(resumes::list_handler))
        .route(routes::POST_USERS_RESUME, post(resumes::create_handler))
        .route(
            routes::USERS_RESUME_ID,
            get(resumes::get_handler).delete(resumes::delete_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.session.clone(),
            require_session,
        ));

    Router::new()
        .merge(protected)
        .layer(cors())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
