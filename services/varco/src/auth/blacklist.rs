//! Access-token revocation.
//!
//! Access tokens are bearer credentials with no server-side state, so logout
//! cannot simply delete them. Instead the revoked token is written to the
//! blacklist, keyed by user, with a TTL equal to the access-token lifetime.
//! Once the token would have expired anyway the entry lapses on its own.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::error::AuthError;
use super::store::SessionStore;
use super::types::{BlacklistEntry, unix_now};

pub struct BlacklistManager {
    sessions: Arc<dyn SessionStore>,
    access_ttl: Duration,
}

impl BlacklistManager {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>, access_ttl: Duration) -> Self {
        Self {
            sessions,
            access_ttl,
        }
    }

    /// Record an access token as revoked for the rest of its lifetime.
    ///
    /// # Errors
    ///
    /// Fails only when the session store is unavailable.
    pub async fn revoke(&self, user_id: &str, access_token: &str) -> Result<(), AuthError> {
        let entry = BlacklistEntry {
            access_token: access_token.to_string(),
            revoked_at: unix_now(),
        };
        self.sessions
            .put_blacklist(user_id, &entry, self.access_ttl)
            .await?;
        debug!(user_id = %user_id, "access token revoked");
        Ok(())
    }

    /// Whether this exact token has been revoked. A user may hold a newer
    /// token after re-login while an older one sits on the blacklist, so the
    /// check compares the token itself, not just the user key.
    ///
    /// # Errors
    ///
    /// Fails only when the session store is unavailable.
    pub async fn is_blacklisted(&self, user_id: &str, access_token: &str) -> Result<bool, AuthError> {
        let entry = self.sessions.get_blacklist(user_id).await?;
        Ok(entry.is_some_and(|entry| entry.access_token == access_token))
    }

    /// Tear down the session and revoke the presented access token. Idempotent
    /// so repeated logouts with the same token succeed.
    ///
    /// # Errors
    ///
    /// Fails only when the session store is unavailable.
    pub async fn logout(&self, user_id: &str, access_token: &str) -> Result<(), AuthError> {
        self.sessions.delete_session(user_id).await?;
        self.revoke(user_id, access_token).await?;
        debug!(user_id = %user_id, "logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemorySessionStore;
    use crate::auth::types::SessionRecord;

    fn manager() -> (BlacklistManager, Arc<MemorySessionStore>) {
        let sessions = Arc::new(MemorySessionStore::new());
        (
            BlacklistManager::new(sessions.clone(), Duration::from_secs(900)),
            sessions,
        )
    }

    #[tokio::test]
    async fn logout_deletes_session_and_blacklists_token() {
        let (manager, sessions) = manager();
        sessions
            .put_session(
                &SessionRecord {
                    user_id: "u1".to_string(),
                    refresh_token: "r1".to_string(),
                    ip: String::new(),
                    user_agent: String::new(),
                },
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        manager.logout("u1", "a1").await.unwrap();

        assert!(sessions.get_session("u1").await.unwrap().is_none());
        assert!(manager.is_blacklisted("u1", "a1").await.unwrap());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (manager, _) = manager();
        manager.logout("u1", "a1").await.unwrap();
        manager.logout("u1", "a1").await.unwrap();
        assert!(manager.is_blacklisted("u1", "a1").await.unwrap());
    }

    #[tokio::test]
    async fn newer_token_is_not_caught_by_old_blacklist_entry() {
        let (manager, _) = manager();
        manager.revoke("u1", "old-token").await.unwrap();

        assert!(manager.is_blacklisted("u1", "old-token").await.unwrap());
        assert!(!manager.is_blacklisted("u1", "new-token").await.unwrap());
    }

    #[tokio::test]
    async fn blacklist_entry_lapses_with_access_ttl() {
        tokio::time::pause();
        let (manager, _) = manager();
        manager.revoke("u1", "a1").await.unwrap();

        tokio::time::advance(Duration::from_secs(901)).await;
        assert!(!manager.is_blacklisted("u1", "a1").await.unwrap());
    }
}
