//! Role gate, layered inside the session middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::session::AuthenticatedUser;
use crate::error::AppError;

/// Roles accepted by a route; any one of them is enough.
#[derive(Debug, Clone)]
pub struct RequiredRoles(Arc<[String]>);

impl RequiredRoles {
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }
}

/// Axum middleware: 403 unless the session identity holds a required role.
pub async fn require_roles(
    State(required): State<RequiredRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(AuthenticatedUser(identity)) = request.extensions().get::<AuthenticatedUser>() else {
        return Err(AppError::Unauthorized("no authenticated session".into()));
    };

    if !identity.has_any_role(&required.0[..]) {
        debug!(user_id = %identity.id, required = ?required.0, "missing required role");
        return Err(AppError::Forbidden("insufficient role".into()));
    }

    Ok(next.run(request).await)
}
