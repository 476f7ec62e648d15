//! Remote auth check against the issuing service.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::cookies::CookiePair;
use crate::routes;

#[derive(Debug, Error)]
pub enum RemoteAuthError {
    /// The authority answered with a non-204, non-5xx status.
    #[error("authority rejected the session with {0}")]
    Rejected(StatusCode),

    /// Transport failure, timeout, unreachable authority or a 5xx answer.
    #[error("authority unavailable: {0}")]
    Unavailable(String),

    /// Local misconfiguration (bad URL, unencodable cookie).
    #[error("remote check failed: {0}")]
    Internal(String),
}

/// Successful check. `set_cookies` holds the rotated tokens, possibly none.
#[derive(Debug, Clone, Default)]
pub struct RemoteCheck {
    pub set_cookies: Vec<HeaderValue>,
}

/// The service that is authoritative for sessions.
#[async_trait]
pub trait AuthAuthority: Send + Sync {
    async fn check(&self, cookies: &CookiePair) -> Result<RemoteCheck, RemoteAuthError>;
}

/// Client settings for [`HttpAuthAuthority`].
#[derive(Debug, Clone)]
pub struct HttpClientSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl HttpClientSettings {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(2)),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 8,
        }
    }

    pub fn build_client(&self) -> Result<reqwest::Client, RemoteAuthError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| RemoteAuthError::Internal(format!("http client: {e}")))
    }
}

/// `GET {authority}/api/v001/auth/check` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthAuthority {
    client: reqwest::Client,
    check_url: Url,
}

impl HttpAuthAuthority {
    pub fn new(client: reqwest::Client, authority: &Url) -> Result<Self, RemoteAuthError> {
        let check_url = authority
            .join(routes::GET_AUTH_CHECK)
            .map_err(|e| RemoteAuthError::Internal(format!("authority url: {e}")))?;
        Ok(Self { client, check_url })
    }

    pub fn check_url(&self) -> &Url {
        &self.check_url
    }
}

#[async_trait]
impl AuthAuthority for HttpAuthAuthority {
    async fn check(&self, cookies: &CookiePair) -> Result<RemoteCheck, RemoteAuthError> {
        let mut request = self.client.get(self.check_url.clone());
        if let Some(value) = cookies
            .to_header_value()
            .map_err(|e| RemoteAuthError::Internal(format!("cookie header: {e}")))?
        {
            request = request.header(COOKIE, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                RemoteAuthError::Internal(e.to_string())
            } else {
                RemoteAuthError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        debug!(url = %self.check_url, status = status.as_u16(), "remote auth check");
        classify_status(status)?;

        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .cloned()
            .collect();
        Ok(RemoteCheck { set_cookies })
    }
}

/// 204 accepts the session. A 5xx means the authority or a gateway in front
/// of it failed, which must not end the client's session.
fn classify_status(status: StatusCode) -> Result<(), RemoteAuthError> {
    if status == StatusCode::NO_CONTENT {
        Ok(())
    } else if status.is_server_error() {
        Err(RemoteAuthError::Unavailable(format!("authority answered {status}")))
    } else {
        Err(RemoteAuthError::Rejected(status))
    }
}
