//! Login endpoint: credential verification and token-pair issuance.

use axum::{Json, extract::Extension, http::HeaderMap, response::IntoResponse};
use tracing::debug;

use super::types::{LoginRequest, UserResponse};
use super::utils::{client_info, token_pair_headers};
use crate::auth::{AuthError, AuthState};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, token pair issued", body = UserResponse),
        (status = 401, description = "Password mismatch, remaining attempts in body"),
        (status = 403, description = "Account blocked"),
        (status = 404, description = "Unknown email"),
        (status = 503, description = "Auth store unavailable")
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<AuthState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let client = client_info(&headers);
    let email = body.email.trim().to_lowercase();

    let (identity, pair) = auth_state
        .authenticator()
        .authenticate(&email, &body.password, &client)
        .await?;
    debug!(user_id = %identity.id, "issuing token pair");

    let response_headers = token_pair_headers(auth_state.config(), &pair);
    Ok((response_headers, Json(UserResponse::from(identity))))
}
