//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use cvgen_core::auth::TokenPair;
use cvgen_core::models::user::{Credentials, PublicUser};

use crate::UserServiceState;
use crate::error::{AppError, AppResult};
use crate::services::auth;
use crate::services::cookies::{CookiePair, REFRESH_COOKIE, clear_headers, pair_headers};

fn cookies_for(pair: &TokenPair, secure: bool) -> AppResult<HeaderMap> {
    pair_headers(pair, secure).map_err(|e| AppError::Internal(format!("set-cookie: {e}")))
}

/// `POST /api/v001/auth/register`: create an account and sign it in.
pub async fn register_handler(
    State(state): State<UserServiceState>,
    Json(body): Json<Credentials>,
) -> AppResult<(StatusCode, HeaderMap, Json<PublicUser>)> {
    let (user, pair) = auth::register(state.users.as_ref(), &state.issuer, &body).await?;
    let headers = cookies_for(&pair, state.config.secure_cookies)?;
    Ok((StatusCode::CREATED, headers, Json(PublicUser::from(&user))))
}

/// `POST /api/v001/auth/login`: authenticate with login + password.
pub async fn login_handler(
    State(state): State<UserServiceState>,
    Json(body): Json<Credentials>,
) -> AppResult<(StatusCode, HeaderMap, Json<PublicUser>)> {
    let (user, pair) = auth::login(state.users.as_ref(), &state.issuer, &body).await?;
    let headers = cookies_for(&pair, state.config.secure_cookies)?;
    Ok((StatusCode::OK, headers, Json(PublicUser::from(&user))))
}

/// `GET /api/v001/auth/refresh`: exchange the refresh cookie for a new pair.
pub async fn refresh_handler(
    State(state): State<UserServiceState>,
    request_headers: HeaderMap,
) -> AppResult<(StatusCode, HeaderMap)> {
    let cookies = CookiePair::from_headers(&request_headers);
    let token = cookies
        .refresh
        .ok_or_else(|| AppError::MissingCredential(format!("{REFRESH_COOKIE} cookie is missing")))?;

    let pair = auth::refresh(
        &state.issuer.verifier(),
        &state.issuer,
        state.roles.as_ref(),
        &token,
    )
    .await?;
    Ok((StatusCode::OK, cookies_for(&pair, state.config.secure_cookies)?))
}

/// `DELETE /api/v001/auth/logout`: clear both cookies. Requires a session.
pub async fn logout_handler(
    State(state): State<UserServiceState>,
) -> AppResult<(StatusCode, HeaderMap)> {
    let headers = clear_headers(state.config.secure_cookies)
        .map_err(|e| AppError::Internal(format!("set-cookie: {e}")))?;
    Ok((StatusCode::NO_CONTENT, headers))
}

/// `GET /api/v001/auth/check`: 204 once the session middleware has passed.
pub async fn check_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}
