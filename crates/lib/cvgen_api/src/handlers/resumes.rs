//! Resume metadata handlers. Every lookup is scoped to the session owner.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::{debug, info};

use cvgen_core::models::resume::{NewResume, ResumeInfo};

use crate::ResumeServiceState;
use crate::error::{AppError, AppResult};
use crate::middleware::session::AuthenticatedUser;

/// Longest accepted resume title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// `GET /api/v001/users/resume/list`: resumes owned by the caller.
pub async fn list_handler(
    State(state): State<ResumeServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<ResumeInfo>>> {
    let resumes = state.resumes.list_for_user(identity.id).await?;
    debug!(user_id = %identity.id, count = resumes.len(), "listed resumes");
    Ok(Json(resumes))
}

/// `POST /api/v001/users/resume`
pub async fn create_handler(
    State(state): State<ResumeServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
    Json(body): Json<NewResume>,
) -> AppResult<(StatusCode, Json<ResumeInfo>)> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    let resume = state.resumes.add(identity.id, title).await?;
    info!(user_id = %identity.id, resume_id = resume.id, "resume created");
    Ok((StatusCode::CREATED, Json(resume)))
}

/// `GET /api/v001/users/resume/{id}`
pub async fn get_handler(
    State(state): State<ResumeServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
    Path(id): Path<u64>,
) -> AppResult<Json<ResumeInfo>> {
    state
        .resumes
        .get(identity.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("resume {id}")))
}

/// `DELETE /api/v001/users/resume/{id}`
pub async fn delete_handler(
    State(state): State<ResumeServiceState>,
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
    Path(id): Path<u64>,
) -> AppResult<StatusCode> {
    if !state.resumes.delete(identity.id, id).await? {
        return Err(AppError::NotFound(format!("resume {id}")));
    }
    info!(user_id = %identity.id, resume_id = id, "resume deleted");
    Ok(StatusCode::NO_CONTENT)
}
