//! Authentication domain models.
//!
//! `TokenClaims` is the wire shape inside every signed token; `Identity` is
//! what the rest of the system sees once a token has been verified.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque user identifier. Zero is never a valid principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(NonZeroU64);

/// Returned when a subject string is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user id: {0:?}")]
pub struct InvalidUserId(pub String);

impl UserId {
    /// Wrap a raw identifier, rejecting zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidUserId(s.to_string()))
    }
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    /// Role names in the order they were granted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            roles: Vec::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// True when at least one of `required` is among this identity's roles.
    pub fn has_any_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required
            .iter()
            .any(|r| self.roles.iter().any(|own| own == r.as_ref()))
    }
}

/// Distinguishes access tokens from refresh tokens inside the claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived, carries roles.
    Access,
    /// Long-lived, carries only the subject.
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims embedded in both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: decimal user id (standard JWT `sub` claim).
    pub sub: String,
    /// Role names, access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    /// Token kind.
    pub typ: TokenKind,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl TokenClaims {
    /// Parse the subject back into a [`UserId`].
    pub fn user_id(&self) -> Result<UserId, InvalidUserId> {
        self.sub.parse()
    }

    /// Map the claims onto an [`Identity`].
    pub fn identity(&self) -> Result<Identity, InvalidUserId> {
        let id = self.user_id()?;
        Ok(Identity::new(id).with_roles(self.roles.clone().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_zero_and_garbage() {
        assert!(UserId::new(0).is_none());
        assert!("0".parse::<UserId>().is_err());
        assert!("-4".parse::<UserId>().is_err());
        assert!("abc".parse::<UserId>().is_err());
        assert_eq!("42".parse::<UserId>().unwrap().get(), 42);
    }

    #[test]
    fn has_any_role_intersects() {
        let id = Identity::new(UserId::new(1).unwrap()).with_roles(["user", "editor"]);
        assert!(id.has_any_role(&["admin", "editor"]));
        assert!(!id.has_any_role(&["admin"]));
        assert!(!id.has_any_role::<&str>(&[]));
    }

    #[test]
    fn refresh_claims_omit_roles_on_the_wire() {
        let claims = TokenClaims {
            sub: "7".into(),
            roles: None,
            typ: TokenKind::Refresh,
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("roles").is_none());
        assert_eq!(json["typ"], "refresh");
    }

    #[test]
    fn untyped_roles_fail_to_deserialize() {
        let raw = r#"{"sub":"1","roles":{"admin":true},"typ":"access","iat":1,"exp":2}"#;
        assert!(serde_json::from_str::<TokenClaims>(raw).is_err());
    }
}
