//! Credential store: read-side access to user identity.
//!
//! The session core only reads identities and flips the active flag when an
//! account is blocked; signup and profile management live elsewhere.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::Instrument;

use super::store::StoreError;
use super::types::{Role, UserIdentity};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, StoreError>;

    /// Flip the account-active flag off. Called when the failed-login counter
    /// crosses the threshold.
    async fn block_user(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Postgres-backed credential store used in deployment.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, StoreError> {
        let query = r"
            SELECT id::text AS id, email, password_hash, role::text AS role, is_active
            FROM users
            WHERE email = $1
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| {
            let role: String = row.get("role");
            let role = Role::parse(&role)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown role: {role}")))?;
            Ok(UserIdentity {
                id: row.get("id"),
                email: row.get("email"),
                password_hash: row.get("password_hash"),
                role,
                is_active: row.get("is_active"),
            })
        })
        .transpose()
    }

    async fn block_user(&self, user_id: &str) -> Result<(), StoreError> {
        let query = r"
            UPDATE users
            SET is_active = FALSE, updated_at = NOW()
            WHERE id::text = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

/// In-memory credential store for tests and local development, keyed by email.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, UserIdentity>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identity: UserIdentity) {
        let mut users = self.users.lock().await;
        users.insert(identity.email.clone(), identity);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, StoreError> {
        Ok(self.users.lock().await.get(email).cloned())
    }

    async fn block_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        for identity in users.values_mut() {
            if identity.id == user_id {
                identity.is_active = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str, email: &str) -> UserIdentity {
        UserIdentity {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Customer,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn memory_store_finds_by_email() -> Result<(), StoreError> {
        let store = MemoryCredentialStore::new();
        store.insert(identity("u1", "alice@example.com")).await;

        let found = store.find_by_email("alice@example.com").await?;
        assert_eq!(found.map(|user| user.id), Some("u1".to_string()));
        assert!(store.find_by_email("bob@example.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_blocks_by_user_id() -> Result<(), StoreError> {
        let store = MemoryCredentialStore::new();
        store.insert(identity("u1", "alice@example.com")).await;

        store.block_user("u1").await?;
        let found = store
            .find_by_email("alice@example.com")
            .await?
            .ok_or_else(|| StoreError::Corrupt("missing user".to_string()))?;
        assert!(!found.is_active);
        Ok(())
    }
}
