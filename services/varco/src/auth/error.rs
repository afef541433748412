//! Typed error taxonomy for the session subsystem.
//!
//! Every failure a caller can observe is one of these kinds. Infrastructure
//! faults (store/database unavailability) are deliberately distinct from
//! authentication failures so clients and operators can apply different retry
//! policies: infra faults are retry-safe, auth faults are not.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login required")]
    LoginRequired,
    #[error("access token missing")]
    AccessTokenMissing,
    #[error("refresh token missing")]
    RefreshTokenMissing,
    #[error("invalid credentials, {remaining_attempts} attempts remaining")]
    PasswordMismatch { remaining_attempts: u32 },
    #[error("account blocked")]
    AccountBlocked,
    #[error("no active session")]
    SessionNotFound,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("auth store unavailable")]
    InfrastructureUnavailable(#[from] StoreError),
}

impl AuthError {
    /// Stable machine-readable kind, independent of the display message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LoginRequired => "login_required",
            Self::AccessTokenMissing => "access_token_missing",
            Self::RefreshTokenMissing => "refresh_token_missing",
            Self::PasswordMismatch { .. } => "password_mismatch",
            Self::AccountBlocked => "account_blocked",
            Self::SessionNotFound => "session_not_found",
            Self::TokenExpired => "token_expired",
            Self::TokenInvalid => "token_invalid",
            Self::Forbidden => "forbidden",
            Self::UserNotFound => "user_not_found",
            Self::InfrastructureUnavailable(_) => "infrastructure_unavailable",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::LoginRequired | Self::AccessTokenMissing => StatusCode::BAD_REQUEST,
            Self::PasswordMismatch { .. }
            | Self::RefreshTokenMissing
            | Self::SessionNotFound
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::AccountBlocked | Self::TokenInvalid | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::InfrastructureUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<session_token::Error> for AuthError {
    fn from(err: session_token::Error) -> Self {
        match err {
            session_token::Error::Expired => Self::TokenExpired,
            _ => Self::TokenInvalid,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        if let Self::InfrastructureUnavailable(err) = &self {
            // Store faults are logged server-side; the body stays generic.
            tracing::error!("auth store fault: {err}");
        }
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Self::PasswordMismatch { remaining_attempts } = &self {
            body["remaining_attempts"] = json!(remaining_attempts);
        }
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_transport_contract() {
        assert_eq!(AuthError::LoginRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::AccessTokenMissing.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::PasswordMismatch {
                remaining_attempts: 3
            }
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::RefreshTokenMissing.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::TokenInvalid.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::AccountBlocked.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::InfrastructureUnavailable(StoreError::Corrupt("x".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn codec_errors_translate_to_taxonomy_kinds() {
        let err: AuthError = session_token::Error::Expired.into();
        assert!(matches!(err, AuthError::TokenExpired));

        let err: AuthError = session_token::Error::InvalidSignature.into();
        assert!(matches!(err, AuthError::TokenInvalid));

        let err: AuthError = session_token::Error::TokenFormat.into();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn password_mismatch_reports_remaining_attempts() {
        let err = AuthError::PasswordMismatch {
            remaining_attempts: 2,
        };
        assert_eq!(err.to_string(), "invalid credentials, 2 attempts remaining");
        assert_eq!(err.kind(), "password_mismatch");
    }
}
