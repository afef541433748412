//! Session store: the single source of truth for cross-request auth state.
//!
//! Three independent key families live here: active refresh sessions
//! (`session:{userId}`), failed-login counters (`failedLoginAttempts:{userId}`),
//! and access-token blacklist entries (`blacklist:{userId}`). Nothing is cached
//! locally; every check round-trips to the store so the behavior stays correct
//! across multiple stateless server instances.

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{Instrument, info_span};

use super::types::{BlacklistEntry, SessionRecord};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
const COMMAND_RETRIES: usize = 3;
const RETRY_MAX_DELAY_MILLIS: u64 = 1_000;

/// Infrastructure fault from either backing store. Kept apart from the auth
/// taxonomy so store unavailability is never mistaken for bad credentials.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store command failed: {0}")]
    Command(#[from] redis::RedisError),
    #[error("credential store query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt store entry: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put_session(&self, record: &SessionRecord, ttl: Duration) -> Result<(), StoreError>;
    async fn get_session(&self, user_id: &str) -> Result<Option<SessionRecord>, StoreError>;
    async fn delete_session(&self, user_id: &str) -> Result<(), StoreError>;

    /// Atomically bump the failed-login counter and return the new value.
    async fn increment_failed_attempts(&self, user_id: &str) -> Result<u32, StoreError>;
    async fn clear_failed_attempts(&self, user_id: &str) -> Result<(), StoreError>;

    async fn put_blacklist(
        &self,
        user_id: &str,
        entry: &BlacklistEntry,
        ttl: Duration,
    ) -> Result<(), StoreError>;
    async fn get_blacklist(&self, user_id: &str) -> Result<Option<BlacklistEntry>, StoreError>;
}

fn session_key(user_id: &str) -> String {
    format!("session:{user_id}")
}

fn failed_attempts_key(user_id: &str) -> String {
    format!("failedLoginAttempts:{user_id}")
}

fn blacklist_key(user_id: &str) -> String {
    format!("blacklist:{user_id}")
}

/// Redis-backed store used in deployment.
#[derive(Clone)]
pub struct RedisSessionStore {
    manager: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect with bounded reconnect retries and command timeouts so an
    /// unavailable store surfaces as a fault instead of hanging requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the initial connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(COMMAND_RETRIES)
            .set_max_delay(RETRY_MAX_DELAY_MILLIS)
            .set_connection_timeout(CONNECT_TIMEOUT)
            .set_response_timeout(COMMAND_TIMEOUT);

        let client = Client::open(redis_url)?;
        let manager = client.get_connection_manager_with_config(config).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put_session(&self, record: &SessionRecord, ttl: Duration) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        let span = info_span!("kv.command", db.system = "redis", db.operation = "SETEX");
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(session_key(&record.user_id), payload, ttl.as_secs())
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn get_session(&self, user_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let span = info_span!("kv.command", db.system = "redis", db.operation = "GET");
        let mut conn = self.manager.clone();
        let payload: Option<String> = conn.get(session_key(user_id)).instrument(span).await?;
        payload
            .map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    async fn delete_session(&self, user_id: &str) -> Result<(), StoreError> {
        let span = info_span!("kv.command", db.system = "redis", db.operation = "DEL");
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(session_key(user_id))
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn increment_failed_attempts(&self, user_id: &str) -> Result<u32, StoreError> {
        let span = info_span!("kv.command", db.system = "redis", db.operation = "INCR");
        let mut conn = self.manager.clone();
        let attempts: i64 = conn
            .incr(failed_attempts_key(user_id), 1i64)
            .instrument(span)
            .await?;
        Ok(u32::try_from(attempts).unwrap_or(u32::MAX))
    }

    async fn clear_failed_attempts(&self, user_id: &str) -> Result<(), StoreError> {
        let span = info_span!("kv.command", db.system = "redis", db.operation = "DEL");
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(failed_attempts_key(user_id))
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn put_blacklist(
        &self,
        user_id: &str,
        entry: &BlacklistEntry,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(entry)?;
        let span = info_span!("kv.command", db.system = "redis", db.operation = "SETEX");
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(blacklist_key(user_id), payload, ttl.as_secs())
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn get_blacklist(&self, user_id: &str) -> Result<Option<BlacklistEntry>, StoreError> {
        let span = info_span!("kv.command", db.system = "redis", db.operation = "GET");
        let mut conn = self.manager.clone();
        let payload: Option<String> = conn.get(blacklist_key(user_id)).instrument(span).await?;
        payload
            .map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }
}

/// In-memory store honoring the same TTL semantics, used by tests and local
/// development. Expiry is driven by tokio time so tests can pause the clock.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (SessionRecord, Instant)>>,
    attempts: Mutex<HashMap<String, u32>>,
    blacklist: Mutex<HashMap<String, (BlacklistEntry, Instant)>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put_session(&self, record: &SessionRecord, ttl: Duration) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            record.user_id.clone(),
            (record.clone(), Instant::now() + ttl),
        );
        Ok(())
    }

    async fn get_session(&self, user_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(user_id) {
            Some((record, expires_at)) if *expires_at > Instant::now() => Ok(Some(record.clone())),
            Some(_) => {
                sessions.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, user_id: &str) -> Result<(), StoreError> {
        self.sessions.lock().await.remove(user_id);
        Ok(())
    }

    async fn increment_failed_attempts(&self, user_id: &str) -> Result<u32, StoreError> {
        let mut attempts = self.attempts.lock().await;
        let counter = attempts.entry(user_id.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn clear_failed_attempts(&self, user_id: &str) -> Result<(), StoreError> {
        self.attempts.lock().await.remove(user_id);
        Ok(())
    }

    async fn put_blacklist(
        &self,
        user_id: &str,
        entry: &BlacklistEntry,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut blacklist = self.blacklist.lock().await;
        blacklist.insert(user_id.to_string(), (entry.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn get_blacklist(&self, user_id: &str) -> Result<Option<BlacklistEntry>, StoreError> {
        let mut blacklist = self.blacklist.lock().await;
        match blacklist.get(user_id) {
            Some((entry, expires_at)) if *expires_at > Instant::now() => Ok(Some(entry.clone())),
            Some(_) => {
                blacklist.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
