//! Core types shared across the session subsystem.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Marketplace roles carried inside access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Owner,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Self::Customer),
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// User identity as read from the credential store.
///
/// The password hash never crosses the API boundary; call [`redacted`] before
/// handing the identity to a response type.
///
/// [`redacted`]: UserIdentity::redacted
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

impl UserIdentity {
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

/// Freshly minted access/refresh pair. Never persisted as a whole; only the
/// refresh token survives inside the [`SessionRecord`].
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Per-user session state, keyed by `session:{userId}` in the session store.
/// At most one live record exists per user; writes overwrite the prior one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: String,
    pub refresh_token: String,
    pub ip: String,
    pub user_agent: String,
}

/// Revocation marker, keyed by `blacklist:{userId}`, expiring with the access
/// token it blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub access_token: String,
    pub revoked_at: i64,
}

/// Request metadata recorded alongside a session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

/// Identity attached to a request once the guard admits it.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(0))
}
