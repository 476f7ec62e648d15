//! Authentication and authorization logic.
//!
//! Token encoding, issuance and verification plus password hashing, shared
//! by every service that takes part in the cookie session protocol.

pub mod issuer;
pub mod jwt;
pub mod password;
pub mod verifier;

use thiserror::Error;

use crate::users::RepositoryError;

pub use issuer::{
    ACCESS_TOKEN_TTL_SECS, IssuedToken, REFRESH_TOKEN_TTL_SECS, TokenIssuer, TokenPair,
};
pub use jwt::TokenCodec;
pub use verifier::TokenVerifier;

/// Token decoding and signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    /// Key misconfiguration. Fatal for the process, never a client error.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}
