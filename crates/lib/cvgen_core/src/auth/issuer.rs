//! Token issuance.

use chrono::{Duration, Utc};

use super::TokenError;
use super::jwt::TokenCodec;
use super::verifier::TokenVerifier;
use crate::models::auth::{Identity, TokenClaims, TokenKind};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    /// Expiry (unix timestamp).
    pub expires_at: i64,
}

/// Access and refresh token minted together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Mints tokens for an identity. Stateless apart from the signing key.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec) -> Self {
        Self::with_ttls(
            codec,
            Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        )
    }

    pub fn with_ttls(codec: TokenCodec, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Subject, roles (when the identity has any) and a short expiry.
    pub fn issue_access_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        let roles = (!identity.roles.is_empty()).then(|| identity.roles.clone());
        self.issue(identity, TokenKind::Access, roles, self.access_ttl)
    }

    /// Subject only, long expiry.
    pub fn issue_refresh_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        self.issue(identity, TokenKind::Refresh, None, self.refresh_ttl)
    }

    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue_access_token(identity)?,
            refresh: self.issue_refresh_token(identity)?,
        })
    }

    /// A verifier sharing this issuer's key.
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(self.codec.clone())
    }

    fn issue(
        &self,
        identity: &Identity,
        kind: TokenKind,
        roles: Option<Vec<String>>,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = (now + ttl).timestamp();
        let claims = TokenClaims {
            sub: identity.id.to_string(),
            roles,
            typ: kind,
            iat: now.timestamp(),
            exp: expires_at,
        };
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken {
            token,
            kind,
            expires_at,
        })
    }
}
