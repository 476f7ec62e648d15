//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use cvgen_core::auth::{AuthError, TokenError};
use cvgen_core::users::RepositoryError;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No refresh cookie on a protected request.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// A presented token failed verification.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_)
            | AppError::InvalidCredentials
            | AppError::MissingCredential(_)
            | AppError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::MissingCredential(_) => "missing_refresh_token",
            AppError::InvalidCredential(_) => "invalid_credential",
            AppError::Forbidden(_) => "forbidden",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::Unauthorized(m)
            | AppError::MissingCredential(m)
            | AppError::InvalidCredential(m)
            | AppError::Forbidden(m)
            | AppError::UpstreamUnavailable(m) => m.clone(),
            AppError::InvalidCredentials => "Invalid login or password".to_string(),
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                "Internal server error".to_string()
            }
        };
        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message,
        });
        (self.status(), body).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(msg) => AppError::Internal(msg),
            other => AppError::InvalidCredential(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::InvalidCredentials,
            AuthError::Token(e) => AppError::from(e),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Repository(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_mapping() {
        let cases = [
            (AppError::MissingCredential("x".into()), 401, "missing_refresh_token"),
            (AppError::InvalidCredential("x".into()), 401, "invalid_credential"),
            (AppError::Forbidden("x".into()), 403, "forbidden"),
            (AppError::UpstreamUnavailable("x".into()), 503, "upstream_unavailable"),
            (AppError::Internal("x".into()), 500, "internal_error"),
            (AppError::Conflict("x".into()), 409, "conflict"),
            (AppError::InvalidCredentials, 401, "invalid_credentials"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn signing_failure_is_internal_not_client_error() {
        let err = AppError::from(TokenError::Signing("bad key".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = AppError::from(TokenError::Expired);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn auth_errors_map_to_account_statuses() {
        assert_eq!(
            AppError::from(AuthError::ValidationError("short".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::Repository(RepositoryError::Conflict("dup".into()))).status(),
            StatusCode::CONFLICT
        );
    }
}
