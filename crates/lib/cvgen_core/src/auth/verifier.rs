//! Local token verification, no network access.

use super::TokenError;
use super::jwt::TokenCodec;
use crate::models::auth::{Identity, TokenKind, UserId};

/// Verifies tokens signed with the shared secret.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    codec: TokenCodec,
}

impl TokenVerifier {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(TokenCodec::new(secret))
    }

    /// Verify an access token and return the identity it proves.
    pub fn verify_access(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = self.codec.decode(token, TokenKind::Access)?;
        claims
            .identity()
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }

    /// Verify a refresh token and return its subject.
    pub fn verify_refresh(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.codec.decode(token, TokenKind::Refresh)?;
        claims
            .user_id()
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }
}
