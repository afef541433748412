//! Credential verification and token minting.
//!
//! The authenticator owns the failure ladder for login attempts: unknown user,
//! blocked account, then password mismatch with a bounded retry budget. The
//! fifth consecutive mismatch flips the account inactive. Successful logins
//! clear the counter and mint a fresh token pair, overwriting any prior
//! session for the user.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use ulid::Ulid;

use session_token::{Claims, TOKEN_VERSION, sign_hs256, verify_hs256};

use super::config::AuthConfig;
use super::credentials::CredentialStore;
use super::error::AuthError;
use super::store::{SessionStore, StoreError};
use super::types::{
    AuthenticatedUser, ClientInfo, Role, SessionRecord, TokenPair, UserIdentity, unix_now,
};

/// Hash a password for storage. Used by account provisioning and fixtures.
///
/// # Errors
///
/// Returns an error if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn password_matches(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        // An unparsable hash is a data problem; fail closed as a mismatch.
        warn!("stored password hash is not parsable");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub struct Authenticator {
    config: AuthConfig,
    sessions: Arc<dyn SessionStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl Authenticator {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        sessions: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            sessions,
            credentials,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify credentials and mint a token pair.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserNotFound`] when the email is unknown.
    /// - [`AuthError::AccountBlocked`] when the account is inactive, or when
    ///   this failure crosses the attempt threshold.
    /// - [`AuthError::PasswordMismatch`] on a wrong password below the
    ///   threshold, carrying the remaining attempt budget.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<(UserIdentity, TokenPair), AuthError> {
        let identity = self
            .credentials
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !identity.is_active {
            return Err(AuthError::AccountBlocked);
        }

        if !password_matches(password, &identity.password_hash) {
            return Err(self.record_failed_attempt(&identity.id).await?);
        }

        self.sessions.clear_failed_attempts(&identity.id).await?;
        let pair = self
            .create_tokens(&identity.id, identity.role, client)
            .await?;
        debug!(user_id = %identity.id, "login succeeded");
        Ok((identity.redacted(), pair))
    }

    /// Bump the failed-login counter and translate the new count into the
    /// error the caller must surface. Crossing the threshold blocks the
    /// account and tears down any live session.
    async fn record_failed_attempt(&self, user_id: &str) -> Result<AuthError, StoreError> {
        let attempts = self.sessions.increment_failed_attempts(user_id).await?;
        let max = self.config.max_failed_attempts();
        if attempts >= max {
            warn!(user_id = %user_id, attempts, "blocking account after repeated login failures");
            self.credentials.block_user(user_id).await?;
            self.sessions.delete_session(user_id).await?;
            return Ok(AuthError::AccountBlocked);
        }
        Ok(AuthError::PasswordMismatch {
            remaining_attempts: max - attempts,
        })
    }

    /// Mint a fresh access/refresh pair and persist the session record.
    ///
    /// The refresh token's subject is an opaque ULID; only the session record
    /// ties it back to the user. Writing the record overwrites any previous
    /// session, so at most one refresh token per user is ever redeemable.
    ///
    /// # Errors
    ///
    /// Fails on signing errors or when the session store is unavailable.
    pub async fn create_tokens(
        &self,
        user_id: &str,
        role: Role,
        client: &ClientInfo,
    ) -> Result<TokenPair, AuthError> {
        let now = unix_now();
        let access_exp = now + i64::try_from(self.config.access_ttl_seconds()).unwrap_or(i64::MAX);
        let refresh_exp =
            now + i64::try_from(self.config.refresh_ttl_seconds()).unwrap_or(i64::MAX);

        let access_claims = Claims {
            v: TOKEN_VERSION,
            iss: self.config.issuer().to_string(),
            aud: self.config.audience().to_string(),
            sub: user_id.to_string(),
            role: Some(role.as_str().to_string()),
            iat: now,
            exp: access_exp,
        };
        let refresh_claims = Claims {
            v: TOKEN_VERSION,
            iss: self.config.issuer().to_string(),
            aud: self.config.audience().to_string(),
            sub: Ulid::new().to_string(),
            role: None,
            iat: now,
            exp: refresh_exp,
        };

        let access_token = sign_hs256(
            self.config.access_secret().expose_secret().as_bytes(),
            &access_claims,
        )?;
        let refresh_token = sign_hs256(
            self.config.refresh_secret().expose_secret().as_bytes(),
            &refresh_claims,
        )?;

        let record = SessionRecord {
            user_id: user_id.to_string(),
            refresh_token: refresh_token.clone(),
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
        };
        self.sessions
            .put_session(&record, Duration::from_secs(self.config.refresh_ttl_seconds()))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token end to end and return the request identity.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenExpired`] for an otherwise-valid expired token,
    /// [`AuthError::TokenInvalid`] for every other verification failure.
    pub fn verify_access(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = verify_hs256(
            token,
            self.config.access_secret().expose_secret().as_bytes(),
            self.config.issuer(),
            self.config.audience(),
            unix_now(),
        )?;
        let role = claims
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or(AuthError::TokenInvalid)?;
        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role,
        })
    }

    /// Verify a presented refresh token against the stored session.
    ///
    /// The token must carry a valid signature, be unexpired, and match the
    /// session record byte for byte. A mismatch means the token was already
    /// rotated away and is treated as a replay.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenExpired`] when the refresh token itself expired.
    /// - [`AuthError::SessionNotFound`] when no session record exists.
    /// - [`AuthError::TokenInvalid`] on signature failure or replay.
    pub async fn verify_refresh(&self, user_id: &str, presented: &str) -> Result<(), AuthError> {
        verify_hs256(
            presented,
            self.config.refresh_secret().expose_secret().as_bytes(),
            self.config.issuer(),
            self.config.audience(),
            unix_now(),
        )?;

        let record = self
            .sessions
            .get_session(user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        if record.refresh_token != presented {
            warn!(user_id = %user_id, "refresh token does not match stored session");
            return Err(AuthError::TokenInvalid);
        }
        Ok(())
    }
}
