//! Small helpers shared by the auth endpoints: client metadata extraction,
//! refresh-cookie construction, and the renewed-credential response headers.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, InvalidHeaderValue, SET_COOKIE},
};
use tracing::error;

use crate::auth::{AuthConfig, ClientInfo, TokenPair, REFRESH_COOKIE};

/// Extract a client IP from common proxy headers, falling back to empty.
pub(super) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Assemble the request metadata recorded alongside a session.
pub(crate) fn client_info(headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        ip: extract_client_ip(headers).unwrap_or_default(),
        user_agent: headers
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    }
}

/// Build the `HttpOnly` refresh cookie carrying a newly minted refresh token.
pub(super) fn refresh_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.refresh_ttl_seconds();
    let mut cookie =
        format!("{REFRESH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build an expired refresh cookie so the browser drops it on logout.
pub(super) fn clear_refresh_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{REFRESH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Response headers announcing a fresh token pair: the access token goes out
/// in `Authorization`, the refresh token in the cookie.
pub(crate) fn token_pair_headers(config: &AuthConfig, pair: &TokenPair) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&format!("Bearer {}", pair.access_token)) {
        Ok(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        Err(err) => error!("failed to build authorization header: {err}"),
    }
    match refresh_cookie(config, &pair.refresh_token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("failed to build refresh cookie: {err}"),
    }
    headers
}
