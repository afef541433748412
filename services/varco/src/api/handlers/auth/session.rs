//! Session endpoints: the guarded session probe and logout.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use tracing::{debug, error};

use session_token::decode_insecure;

use super::types::SessionResponse;
use super::utils::{clear_refresh_cookie, client_info, token_pair_headers};
use crate::auth::{AuthError, AuthState};

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Access token accepted, identity attached", body = SessionResponse),
        (status = 400, description = "Authorization header missing or empty"),
        (status = 401, description = "Token expired and not renewable"),
        (status = 403, description = "Token invalid, blacklisted, or replayed"),
        (status = 503, description = "Auth store unavailable")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<AuthState>,
) -> Result<impl IntoResponse, AuthError> {
    let client = client_info(&headers);
    let outcome = auth_state.guard().authorize(&headers, &client).await?;

    let response_headers = match &outcome.renewed {
        Some(pair) => token_pair_headers(auth_state.config(), pair),
        None => HeaderMap::new(),
    };
    let body = SessionResponse::new(outcome.user.user_id, outcome.user.role);
    Ok((response_headers, Json(body)))
}

/// Resolve the logout subject from the bearer token.
///
/// An expired token still identifies whose session to tear down, so expiry is
/// tolerated here; anything else (bad signature, malformed claims) is not.
fn logout_subject(auth_state: &AuthState, token: &str) -> Result<String, AuthError> {
    match auth_state.authenticator().verify_access(token) {
        Ok(user) => Ok(user.user_id),
        Err(AuthError::TokenExpired) => {
            let claims = decode_insecure(token).map_err(|_| AuthError::Forbidden)?;
            Ok(claims.sub)
        }
        Err(err) => Err(err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session deleted and access token revoked"),
        (status = 400, description = "Authorization header missing or empty"),
        (status = 403, description = "Token invalid"),
        (status = 503, description = "Auth store unavailable")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<AuthState>,
) -> Result<impl IntoResponse, AuthError> {
    let token = super::bearer_token(&headers)?;
    let user_id = logout_subject(&auth_state, token)?;

    auth_state.blacklist().logout(&user_id, token).await?;
    debug!(user_id = %user_id, "session terminated");

    // Always clear the cookie so the browser drops the refresh token.
    let mut response_headers = HeaderMap::new();
    match clear_refresh_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("failed to build clearing cookie: {err}"),
    }
    Ok((StatusCode::NO_CONTENT, response_headers))
}
