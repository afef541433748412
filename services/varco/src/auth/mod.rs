//! Session core: login, silent token renewal, and logout.
//!
//! The subsystem is wired together through [`AuthState`]; the HTTP layer only
//! ever talks to the [`Authenticator`], [`SessionGuard`], and
//! [`BlacklistManager`] it exposes. All cross-request state lives in the
//! [`SessionStore`] and [`CredentialStore`] implementations so the server
//! itself stays stateless.

use std::sync::Arc;
use std::time::Duration;

pub mod authenticator;
pub mod blacklist;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod store;
pub mod types;


pub use authenticator::{Authenticator, hash_password};
pub use blacklist::BlacklistManager;
pub use config::AuthConfig;
pub use credentials::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
pub use error::AuthError;
pub use guard::{GuardOutcome, REFRESH_COOKIE, SessionGuard};
pub use store::{MemorySessionStore, RedisSessionStore, SessionStore, StoreError};
pub use types::{
    AuthenticatedUser, BlacklistEntry, ClientInfo, Role, SessionRecord, TokenPair, UserIdentity,
};

/// Shared handle wiring the session core together for the HTTP layer.
#[derive(Clone)]
pub struct AuthState {
    authenticator: Arc<Authenticator>,
    blacklist: Arc<BlacklistManager>,
    guard: Arc<SessionGuard>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        sessions: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let access_ttl = Duration::from_secs(config.access_ttl_seconds());
        let authenticator = Arc::new(Authenticator::new(config, sessions.clone(), credentials));
        let blacklist = Arc::new(BlacklistManager::new(sessions, access_ttl));
        let guard = Arc::new(SessionGuard::new(authenticator.clone(), blacklist.clone()));
        Self {
            authenticator,
            blacklist,
            guard,
        }
    }

    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn blacklist(&self) -> &BlacklistManager {
        &self.blacklist
    }

    #[must_use]
    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        self.authenticator.config()
    }
}
