//! Request admission: the per-request token check with silent renewal.
//!
//! Every protected request passes through [`SessionGuard::authorize`]. A valid
//! access token is admitted directly; an expired one triggers the refresh
//! path, which rotates both tokens in one step and blacklists the expired
//! access token so it cannot be replayed while its blacklist window is open.

use axum::http::{HeaderMap, header};
use std::sync::Arc;
use tracing::debug;

use session_token::decode_insecure;

use super::authenticator::Authenticator;
use super::blacklist::BlacklistManager;
use super::error::AuthError;
use super::types::{AuthenticatedUser, ClientInfo, Role, TokenPair};

pub const REFRESH_COOKIE: &str = "varco_refresh";

/// Result of admitting a request. When the access token was silently renewed,
/// `renewed` carries the replacement pair the transport must hand back to the
/// client.
#[derive(Debug)]
pub struct GuardOutcome {
    pub user: AuthenticatedUser,
    pub renewed: Option<TokenPair>,
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::LoginRequired)?;
    let value = value.to_str().map_err(|_| AuthError::AccessTokenMissing)?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AuthError::AccessTokenMissing);
    }
    Ok(token)
}

fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == REFRESH_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

pub struct SessionGuard {
    authenticator: Arc<Authenticator>,
    blacklist: Arc<BlacklistManager>,
}

impl SessionGuard {
    #[must_use]
    pub fn new(authenticator: Arc<Authenticator>, blacklist: Arc<BlacklistManager>) -> Self {
        Self {
            authenticator,
            blacklist,
        }
    }

    /// Admit or reject a request based on its `Authorization` header and
    /// refresh cookie.
    ///
    /// # Errors
    ///
    /// - [`AuthError::LoginRequired`] with no `Authorization` header at all.
    /// - [`AuthError::AccessTokenMissing`] with an empty bearer value.
    /// - [`AuthError::Forbidden`] when the token is valid but blacklisted, or
    ///   when an expired token is too corrupt to recover a subject from.
    /// - [`AuthError::RefreshTokenMissing`] when the token expired and no
    ///   refresh cookie accompanies it.
    /// - Refresh-path failures surface as [`AuthError::TokenExpired`],
    ///   [`AuthError::SessionNotFound`], or [`AuthError::TokenInvalid`].
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        client: &ClientInfo,
    ) -> Result<GuardOutcome, AuthError> {
        let access_token = bearer_token(headers)?;

        match self.authenticator.verify_access(access_token) {
            Ok(user) => {
                if self
                    .blacklist
                    .is_blacklisted(&user.user_id, access_token)
                    .await?
                {
                    return Err(AuthError::Forbidden);
                }
                Ok(GuardOutcome {
                    user,
                    renewed: None,
                })
            }
            Err(AuthError::TokenExpired) => {
                let refresh_token =
                    refresh_cookie(headers).ok_or(AuthError::RefreshTokenMissing)?;
                self.renew(access_token, &refresh_token, client).await
            }
            Err(err) => Err(err),
        }
    }

    /// The refresh path: recover the subject from the expired access token,
    /// redeem the refresh token, rotate the pair, and revoke the old access
    /// token.
    async fn renew(
        &self,
        expired_access: &str,
        refresh_token: &str,
        client: &ClientInfo,
    ) -> Result<GuardOutcome, AuthError> {
        // The expired token already passed a signature check; the insecure
        // decode only recovers its claims. Structural corruption here means
        // a forged token and fails closed.
        let claims = decode_insecure(expired_access).map_err(|_| AuthError::Forbidden)?;
        let role = claims
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or(AuthError::Forbidden)?;
        let user_id = claims.sub;

        // An expired token that already went through rotation sits on the
        // blacklist; replaying it must not trigger a second rotation.
        if self
            .blacklist
            .is_blacklisted(&user_id, expired_access)
            .await?
        {
            return Err(AuthError::Forbidden);
        }

        self.authenticator
            .verify_refresh(&user_id, refresh_token)
            .await?;

        let pair = self
            .authenticator
            .create_tokens(&user_id, role, client)
            .await?;
        self.blacklist.revoke(&user_id, expired_access).await?;
        debug!(user_id = %user_id, "access token silently renewed");

        Ok(GuardOutcome {
            user: AuthenticatedUser { user_id, role },
            renewed: Some(pair),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::LoginRequired)
        ));
    }

    #[test]
    fn bearer_token_rejects_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::AccessTokenMissing)
        ));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(""));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::AccessTokenMissing)
        ));
    }

    #[test]
    fn bearer_token_strips_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn refresh_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; varco_refresh=tok123; lang=en"),
        );
        assert_eq!(refresh_cookie(&headers), Some("tok123".to_string()));
    }

    #[test]
    fn refresh_cookie_missing_or_empty_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(refresh_cookie(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("varco_refresh="));
        assert_eq!(refresh_cookie(&headers), None);
    }
}
