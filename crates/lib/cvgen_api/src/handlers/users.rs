//! User account and profile handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::info;

use cvgen_core::models::auth::UserId;
use cvgen_core::models::user::{PublicUser, UserProfile};

use crate::UserServiceState;
use crate::error::{AppError, AppResult};
use crate::middleware::session::AuthenticatedUser;

/// `GET /api/v001/users/info`: the caller's own account and profile.
pub async fn info_handler(
    State(state): State<UserServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", identity.id)))?;
    let profile = state.users.find_profile(identity.id).await?;
    Ok(Json(PublicUser::from(&user).with_profile(profile)))
}

/// `POST /api/v001/users/info`: first profile for the caller.
pub async fn create_profile_handler(
    State(state): State<UserServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
    Json(profile): Json<UserProfile>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    if state.users.find_by_id(identity.id).await?.is_none() {
        return Err(AppError::NotFound(format!("user {}", identity.id)));
    }
    let profile = state.users.create_profile(identity.id, profile).await?;
    info!(user_id = %identity.id, "profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `PUT /api/v001/users/info`: replace the caller's profile.
pub async fn update_profile_handler(
    State(state): State<UserServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
    Json(profile): Json<UserProfile>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .users
        .update_profile(identity.id, profile)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile for user {}", identity.id)))?;
    info!(user_id = %identity.id, "profile updated");
    Ok(Json(profile))
}

/// `GET /api/v001/admin/users/{id}`: any user's profile. Admin only.
pub async fn get_user_handler(
    State(state): State<UserServiceState>,
    Path(id): Path<u64>,
) -> AppResult<Json<PublicUser>> {
    let id = UserId::new(id).ok_or_else(|| AppError::Validation("user id must be positive".into()))?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    Ok(Json(PublicUser::from(&user)))
}
