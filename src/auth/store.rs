//! Credential store: user rows and the token blacklist.
//!
//! `CredentialStore` is the seam the auth flow and session guard depend on;
//! `SqliteCredentialStore` is the sqlx-backed implementation. Every lookup here
//! hits a primary key or a unique index.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{BlacklistEntry, NewUser, ProfileChanges, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint (email, username) rejected the write
    #[error("unique constraint violated")]
    Conflict,
}

fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Database(e)
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `email` must already be normalized
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::Conflict` when the email or username is taken
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError>;

    /// Applies the non-`None` fields and bumps `updated_at`; `None` if no such user
    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError>;

    /// Returns false if no such user
    async fn mark_verified(&self, user_id: &str) -> Result<bool, StoreError>;

    async fn is_token_revoked(&self, token: &str) -> Result<bool, StoreError>;

    /// Revoking an already revoked token is a no-op
    async fn revoke_token(&self, entry: &BlacklistEntry) -> Result<(), StoreError>;

    /// Deletes entries whose token expired before `now` (unix seconds)
    async fn prune_blacklist(&self, now: i64) -> Result<u64, StoreError>;
}

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, profile_image, \
     hashed_password, is_active, is_google_user, is_verified, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    db: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn find_user_where(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where("email", email).await
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where("id", id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where("username", username).await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "INSERT INTO users (id, email, username, first_name, last_name, profile_image, \
             hashed_password, is_active, is_google_user, is_verified, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, 0, ?, ?) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.profile_image)
            .bind(&user.hashed_password)
            .bind(user.is_google_user)
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.db)
            .await
            .map_err(map_write_error)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET \
             first_name = COALESCE(?, first_name), \
             last_name = COALESCE(?, last_name), \
             username = COALESCE(?, username), \
             profile_image = COALESCE(?, profile_image), \
             updated_at = ? \
             WHERE id = ? RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.username)
            .bind(&changes.profile_image)
            .bind(Utc::now().to_rfc3339())
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_write_error)
    }

    async fn mark_verified(&self, user_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET is_verified = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_token_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let hit: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM token_blacklist WHERE token = ? LIMIT 1")
                .bind(token)
                .fetch_optional(&self.db)
                .await?;
        Ok(hit.is_some())
    }

    async fn revoke_token(&self, entry: &BlacklistEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO token_blacklist (token, user_id, reason, revoked_at, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.token)
        .bind(&entry.user_id)
        .bind(&entry.reason)
        .bind(&entry.revoked_at)
        .bind(entry.expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn prune_blacklist(&self, now: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < ?")
            .bind(now)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::memory_pool;

    fn new_user(id: &str, email: &str, username: Option<&str>) -> NewUser {
        NewUser {
            id: id.to_string(),
            email: email.to_string(),
            username: username.map(str::to_string),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            profile_image: None,
            hashed_password: Some("$2b$04$placeholder".to_string()),
            is_google_user: false,
        }
    }

    fn entry(token: &str, expires_at: i64) -> BlacklistEntry {
        BlacklistEntry {
            token: token.to_string(),
            user_id: Some("U_1".to_string()),
            reason: Some("logout".to_string()),
            revoked_at: Utc::now().to_rfc3339(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        let created = store
            .insert_user(&new_user("U_1", "ada@example.com", Some("ada")))
            .await
            .unwrap();

        assert!(created.is_active);
        assert!(!created.is_google_user);
        assert!(!created.is_verified);
        assert_eq!(created.created_at, created.updated_at);

        let by_email = store.find_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email.as_ref(), Some(&created));
        let by_id = store.find_user_by_id("U_1").await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&created));
        let by_username = store.find_user_by_username("ada").await.unwrap();
        assert_eq!(by_username.as_ref(), Some(&created));

        assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        store
            .insert_user(&new_user("U_1", "ada@example.com", None))
            .await
            .unwrap();

        let err = store
            .insert_user(&new_user("U_2", "ada@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict_but_null_usernames_coexist() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        store.insert_user(&new_user("U_1", "a@x.com", None)).await.unwrap();
        store.insert_user(&new_user("U_2", "b@x.com", None)).await.unwrap();
        store
            .insert_user(&new_user("U_3", "c@x.com", Some("taken")))
            .await
            .unwrap();

        let err = store
            .insert_user(&new_user("U_4", "d@x.com", Some("taken")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_update_profile_applies_only_given_fields() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        let created = store
            .insert_user(&new_user("U_1", "ada@example.com", None))
            .await
            .unwrap();

        let changes = ProfileChanges {
            first_name: Some("Augusta".to_string()),
            profile_image: Some("avatars/ada.png".to_string()),
            ..Default::default()
        };
        let updated = store.update_profile("U_1", &changes).await.unwrap().unwrap();

        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name, created.last_name);
        assert_eq!(updated.profile_image.as_deref(), Some("avatars/ada.png"));
        assert_eq!(updated.username, None);

        assert!(store.update_profile("U_missing", &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        store
            .insert_user(&new_user("U_1", "ada@example.com", None))
            .await
            .unwrap();

        assert!(store.mark_verified("U_1").await.unwrap());
        assert!(store.find_user_by_id("U_1").await.unwrap().unwrap().is_verified);
        assert!(!store.mark_verified("U_missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_and_visible() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        assert!(!store.is_token_revoked("tok-1").await.unwrap());

        store.revoke_token(&entry("tok-1", 2_000_000_000)).await.unwrap();
        store.revoke_token(&entry("tok-1", 2_000_000_000)).await.unwrap();

        assert!(store.is_token_revoked("tok-1").await.unwrap());
        assert!(!store.is_token_revoked("tok-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_prune_removes_only_expired_entries() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        store.revoke_token(&entry("old", 100)).await.unwrap();
        store.revoke_token(&entry("fresh", 10_000)).await.unwrap();

        let removed = store.prune_blacklist(5_000).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!store.is_token_revoked("old").await.unwrap());
        assert!(store.is_token_revoked("fresh").await.unwrap());
    }
}
