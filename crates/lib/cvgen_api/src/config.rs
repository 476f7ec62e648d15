//! API server configuration.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default bound on a single remote auth check.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("JWT secret must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    SecretTooShort(usize),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Configuration shared by both services, filled in by each binary from
/// its parsed command line.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// HS256 secret, identical in every service that verifies tokens.
    pub jwt_secret: String,
    /// Add `Secure` to every auth cookie.
    pub secure_cookies: bool,
    /// Base URL of the auth authority. Only the delegating service needs it.
    pub auth_service_url: Option<Url>,
    /// Upper bound for one remote auth check.
    pub check_timeout: Duration,
    /// Confirm even locally valid access tokens with the authority.
    pub strict_delegation: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("secure_cookies", &self.secure_cookies)
            .field("auth_service_url", &self.auth_service_url)
            .field("check_timeout", &self.check_timeout)
            .field("strict_delegation", &self.strict_delegation)
            .finish()
    }
}

impl ApiConfig {
    /// Checks invariants that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_secret(&self.jwt_secret)
    }

    /// The authority URL, required by the delegating service.
    pub fn require_auth_service_url(&self) -> Result<&Url, ConfigError> {
        self.auth_service_url
            .as_ref()
            .ok_or(ConfigError::Missing("AUTH_SERVICE_URL"))
    }
}

pub fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::SecretTooShort(secret.len()));
    }
    Ok(())
}

pub fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
