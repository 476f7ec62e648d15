//! Auth cookie shape: names, values, lifetimes and flags.
//!
//! Every service builds and reads its auth cookies through this module, so
//! the issuing and the delegating service emit byte-identical headers.

use axum::http::header::{COOKIE, InvalidHeaderValue, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use cvgen_core::auth::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, TokenPair};
use cvgen_core::models::auth::TokenKind;

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "Authorization";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "Refresh-Token";
/// Prefix on the access cookie value.
pub const BEARER_PREFIX: &str = "Bearer ";

pub fn cookie_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => ACCESS_COOKIE,
        TokenKind::Refresh => REFRESH_COOKIE,
    }
}

fn max_age(kind: TokenKind) -> Duration {
    match kind {
        TokenKind::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        TokenKind::Refresh => Duration::seconds(REFRESH_TOKEN_TTL_SECS),
    }
}

fn build(kind: TokenKind, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((cookie_name(kind), value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Build the auth cookie carrying `token`.
pub fn token_to_cookie(kind: TokenKind, token: &str, secure: bool) -> Cookie<'static> {
    let value = match kind {
        TokenKind::Access => format!("{BEARER_PREFIX}{token}"),
        TokenKind::Refresh => token.to_string(),
    };
    build(kind, value, max_age(kind), secure)
}

/// Build an expired cookie that removes `kind` from the client.
pub fn clear_cookie(kind: TokenKind, secure: bool) -> Cookie<'static> {
    build(kind, String::new(), Duration::seconds(-1), secure)
}

/// Raw token from a cookie value.
pub fn cookie_to_token(value: &str) -> &str {
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value)
}

/// `Set-Cookie` header value for a cookie.
pub fn set_cookie_value(cookie: &Cookie<'_>) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
}

/// `Set-Cookie` headers for both tokens of a freshly issued pair.
pub fn pair_headers(pair: &TokenPair, secure: bool) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    for issued in [&pair.access, &pair.refresh] {
        let cookie = token_to_cookie(issued.kind, &issued.token, secure);
        headers.append(SET_COOKIE, set_cookie_value(&cookie)?);
    }
    Ok(headers)
}

/// `Set-Cookie` headers that clear both tokens.
pub fn clear_headers(secure: bool) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    for kind in [TokenKind::Access, TokenKind::Refresh] {
        headers.append(SET_COOKIE, set_cookie_value(&clear_cookie(kind, secure))?);
    }
    Ok(headers)
}

/// Name of the cookie a `Set-Cookie` header value sets.
pub fn set_cookie_name(value: &HeaderValue) -> Option<String> {
    let raw = value.to_str().ok()?;
    Cookie::parse(raw).ok().map(|c| c.name().to_string())
}

/// Token carried by a `Set-Cookie` header value, if it sets `kind`.
pub fn token_from_set_cookie(value: &HeaderValue, kind: TokenKind) -> Option<String> {
    let raw = value.to_str().ok()?;
    let cookie = Cookie::parse(raw).ok()?;
    if cookie.name() != cookie_name(kind) || cookie.value().is_empty() {
        return None;
    }
    Some(cookie_to_token(cookie.value()).to_string())
}

/// Both auth tokens as presented on a request, prefixes stripped.
///
/// The `name=value` segments they were read from are kept verbatim so the
/// pair can be forwarded without re-encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookiePair {
    pub access: Option<String>,
    pub refresh: Option<String>,
    raw_access: Option<String>,
    raw_refresh: Option<String>,
}

impl CookiePair {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        let token = |name: &str| {
            jar.get(name)
                .map(|c| cookie_to_token(c.value()).to_string())
                .filter(|t| !t.is_empty())
        };
        let access = token(ACCESS_COOKIE);
        let refresh = token(REFRESH_COOKIE);
        Self {
            raw_access: access.as_ref().and_then(|_| raw_segment(headers, ACCESS_COOKIE)),
            raw_refresh: refresh.as_ref().and_then(|_| raw_segment(headers, REFRESH_COOKIE)),
            access,
            refresh,
        }
    }

    /// `Cookie` request header carrying the pair to another service, made
    /// of the segments exactly as the client sent them.
    pub fn to_header_value(&self) -> Result<Option<HeaderValue>, InvalidHeaderValue> {
        let parts: Vec<&str> = [&self.raw_access, &self.raw_refresh]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }
        HeaderValue::from_str(&parts.join("; ")).map(Some)
    }
}

/// Last `name=value` segment for `name` across all `Cookie` headers.
fn raw_segment(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .filter(|segment| {
            segment
                .split_once('=')
                .is_some_and(|(n, _)| n.trim() == name)
        })
        .last()
        .map(str::to_string)
}
