//! Cookie session middleware.
//!
//! Every protected request carries a refresh token and, usually, an access
//! token. A valid pair proceeds untouched. When the access token is missing
//! or invalid but the refresh token verifies, a new access token is obtained
//! either by minting it here (issuing service) or by asking the authority
//! (delegating service), and the rotated cookies ride on the response.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use cvgen_core::auth::{TokenError, TokenIssuer, TokenVerifier};
use cvgen_core::models::auth::{Identity, TokenKind, UserId};
use cvgen_core::users::RoleProvider;

use crate::error::AppError;
use crate::services::cookies::{
    CookiePair, REFRESH_COOKIE, clear_headers, pair_headers, set_cookie_name,
    token_from_set_cookie,
};
use crate::services::remote_auth::{AuthAuthority, RemoteAuthError};

/// Key used to store the verified identity in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// How a missing or invalid access token is replaced.
pub enum SessionBackend {
    /// This process owns the signing secret and mints tokens itself.
    Local {
        issuer: TokenIssuer,
        roles: Arc<dyn RoleProvider>,
    },
    /// This process only verifies; the authority mints.
    Delegated {
        verifier: TokenVerifier,
        authority: Arc<dyn AuthAuthority>,
        check_timeout: Duration,
        /// Confirm even locally valid access tokens with the authority.
        strict: bool,
    },
}

/// Why a request was not authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    MissingRefreshToken,
    InvalidRefreshToken(TokenError),
    /// Refresh failed or the authority rejected the session.
    Rejected(String),
}

/// Result of authenticating one request.
#[derive(Debug)]
pub enum SessionOutcome {
    Authenticated {
        identity: Identity,
        set_cookies: Vec<HeaderValue>,
    },
    Unauthenticated {
        failure: SessionFailure,
        clear_cookies: bool,
    },
    ServiceUnavailable,
}

impl From<SessionFailure> for AppError {
    fn from(failure: SessionFailure) -> Self {
        match failure {
            SessionFailure::MissingRefreshToken => {
                AppError::MissingCredential(format!("{REFRESH_COOKIE} cookie is missing"))
            }
            SessionFailure::InvalidRefreshToken(e) => {
                AppError::InvalidCredential(format!("invalid refresh token: {e}"))
            }
            SessionFailure::Rejected(reason) => AppError::InvalidCredential(reason),
        }
    }
}

/// Shared, cheaply cloned session authenticator.
#[derive(Clone)]
pub struct SessionGuard {
    backend: Arc<SessionBackend>,
    secure_cookies: bool,
}

impl SessionGuard {
    pub fn new(backend: SessionBackend, secure_cookies: bool) -> Self {
        Self {
            backend: Arc::new(backend),
            secure_cookies,
        }
    }

    pub fn local(issuer: TokenIssuer, roles: Arc<dyn RoleProvider>, secure_cookies: bool) -> Self {
        Self::new(SessionBackend::Local { issuer, roles }, secure_cookies)
    }

    pub fn delegated(
        verifier: TokenVerifier,
        authority: Arc<dyn AuthAuthority>,
        check_timeout: Duration,
        strict: bool,
        secure_cookies: bool,
    ) -> Self {
        Self::new(
            SessionBackend::Delegated {
                verifier,
                authority,
                check_timeout,
                strict,
            },
            secure_cookies,
        )
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    fn verifier(&self) -> TokenVerifier {
        match self.backend.as_ref() {
            SessionBackend::Local { issuer, .. } => issuer.verifier(),
            SessionBackend::Delegated { verifier, .. } => verifier.clone(),
        }
    }

    /// Run the session state machine over a request's headers.
    ///
    /// `Err` only for local misconfiguration; every client-caused failure is
    /// an `Unauthenticated` outcome.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<SessionOutcome, AppError> {
        let cookies = CookiePair::from_headers(headers);

        let Some(refresh) = cookies.refresh.as_deref() else {
            debug!("no refresh cookie");
            return Ok(SessionOutcome::Unauthenticated {
                failure: SessionFailure::MissingRefreshToken,
                clear_cookies: false,
            });
        };

        let verifier = self.verifier();
        let subject = match verifier.verify_refresh(refresh) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "refresh token rejected");
                return Ok(SessionOutcome::Unauthenticated {
                    failure: SessionFailure::InvalidRefreshToken(e),
                    clear_cookies: true,
                });
            }
        };

        let access = match cookies.access.as_deref().map(|t| verifier.verify_access(t)) {
            Some(Ok(identity)) if identity.id == subject => Some(identity),
            Some(Ok(identity)) => {
                debug!(access = %identity.id, refresh = %subject, "token subjects differ");
                None
            }
            Some(Err(e)) => {
                debug!(error = %e, "access token rejected");
                None
            }
            None => None,
        };

        match self.backend.as_ref() {
            SessionBackend::Local { issuer, roles } => match access {
                Some(identity) => Ok(authenticated(identity)),
                None => self.mint(issuer, roles.as_ref(), subject).await,
            },
            SessionBackend::Delegated {
                verifier,
                authority,
                check_timeout,
                strict,
            } => match access {
                Some(identity) if !*strict => Ok(authenticated(identity)),
                access => {
                    self.delegate(
                        verifier,
                        authority.as_ref(),
                        *check_timeout,
                        &cookies,
                        subject,
                        access,
                    )
                    .await
                }
            },
        }
    }

    async fn mint(
        &self,
        issuer: &TokenIssuer,
        roles: &dyn RoleProvider,
        subject: UserId,
    ) -> Result<SessionOutcome, AppError> {
        let identity = Identity::new(subject).with_roles(roles.roles_for(subject).await);
        let pair = issuer.issue_pair(&identity)?;
        let headers = pair_headers(&pair, self.secure_cookies)
            .map_err(|e| AppError::Internal(format!("set-cookie: {e}")))?;
        debug!(user_id = %subject, "access token re-issued from refresh token");
        Ok(SessionOutcome::Authenticated {
            identity,
            set_cookies: headers.get_all(SET_COOKIE).iter().cloned().collect(),
        })
    }

    async fn delegate(
        &self,
        verifier: &TokenVerifier,
        authority: &dyn AuthAuthority,
        check_timeout: Duration,
        cookies: &CookiePair,
        subject: UserId,
        local: Option<Identity>,
    ) -> Result<SessionOutcome, AppError> {
        let check = match tokio::time::timeout(check_timeout, authority.check(cookies)).await {
            Err(_) => {
                warn!(timeout = ?check_timeout, "auth authority timed out");
                return Ok(SessionOutcome::ServiceUnavailable);
            }
            Ok(Err(RemoteAuthError::Unavailable(reason))) => {
                warn!(%reason, "auth authority unreachable");
                return Ok(SessionOutcome::ServiceUnavailable);
            }
            Ok(Err(RemoteAuthError::Rejected(status))) => {
                debug!(status = status.as_u16(), "auth authority rejected session");
                return Ok(SessionOutcome::Unauthenticated {
                    failure: SessionFailure::Rejected(format!("session rejected ({status})")),
                    clear_cookies: false,
                });
            }
            Ok(Err(RemoteAuthError::Internal(reason))) => return Err(AppError::Internal(reason)),
            Ok(Ok(check)) => check,
        };

        let rotated = check
            .set_cookies
            .iter()
            .find_map(|v| token_from_set_cookie(v, TokenKind::Access));
        let identity = match rotated {
            Some(token) => match verifier.verify_access(&token) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!(error = %e, "authority issued an unverifiable access token");
                    None
                }
            },
            None => local,
        };

        match identity {
            Some(identity) if identity.id == subject => Ok(SessionOutcome::Authenticated {
                identity,
                set_cookies: check.set_cookies,
            }),
            _ => Ok(SessionOutcome::Unauthenticated {
                failure: SessionFailure::Rejected("no usable access token after refresh".into()),
                clear_cookies: false,
            }),
        }
    }
}

fn authenticated(identity: Identity) -> SessionOutcome {
    SessionOutcome::Authenticated {
        identity,
        set_cookies: Vec::new(),
    }
}

/// Append `set_cookies` unless the handler already set a cookie of that name.
fn append_set_cookies(response: &mut Response, set_cookies: Vec<HeaderValue>) {
    let taken: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(set_cookie_name)
        .collect();
    for value in set_cookies {
        if set_cookie_name(&value).is_some_and(|name| taken.contains(&name)) {
            continue;
        }
        response.headers_mut().append(SET_COOKIE, value);
    }
}

/// Axum middleware: authenticates the cookie session and injects
/// `AuthenticatedUser` into request extensions.
pub async fn require_session(
    State(guard): State<SessionGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = match guard.authenticate(request.headers()).await {
        Ok(outcome) => outcome,
        Err(e) => return e.into_response(),
    };

    match outcome {
        SessionOutcome::Authenticated {
            identity,
            set_cookies,
        } => {
            request.extensions_mut().insert(AuthenticatedUser(identity));
            let mut response = next.run(request).await;
            append_set_cookies(&mut response, set_cookies);
            response
        }
        SessionOutcome::Unauthenticated {
            failure,
            clear_cookies,
        } => {
            let mut response = AppError::from(failure).into_response();
            if clear_cookies {
                let cleared = match clear_headers(guard.secure_cookies()) {
                    Ok(headers) => headers,
                    Err(e) => return AppError::Internal(format!("set-cookie: {e}")).into_response(),
                };
                append_set_cookies(
                    &mut response,
                    cleared.get_all(SET_COOKIE).iter().cloned().collect(),
                );
            }
            response
        }
        SessionOutcome::ServiceUnavailable => {
            AppError::UpstreamUnavailable("auth service unavailable".into()).into_response()
        }
    }
}
