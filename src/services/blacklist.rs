// src/services/blacklist.rs
//! Background pruning of the token blacklist.
//!
//! An expired token is rejected on expiry alone, so its blacklist row is dead weight
//! once `expires_at` has passed.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::auth::store::{CredentialStore, StoreError};

/// Delete every blacklist entry whose token has already expired
pub async fn prune_expired(store: &dyn CredentialStore) -> Result<u64, StoreError> {
    let removed = store.prune_blacklist(Utc::now().timestamp()).await?;
    if removed > 0 {
        info!(removed, "Pruned expired token blacklist entries");
    } else {
        debug!("No expired token blacklist entries to prune");
    }
    Ok(removed)
}

pub fn start_blacklist_pruning(store: Arc<dyn CredentialStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = prune_expired(store.as_ref()).await {
                error!(error = %e, "Token blacklist pruning failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::BlacklistEntry;
    use crate::auth::store::SqliteCredentialStore;
    use crate::common::test_support::memory_pool;

    fn entry(token: &str, expires_at: i64) -> BlacklistEntry {
        BlacklistEntry {
            token: token.to_string(),
            user_id: None,
            reason: Some("logout".to_string()),
            revoked_at: Utc::now().to_rfc3339(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_prune_expired_keeps_live_entries() {
        let store = SqliteCredentialStore::new(memory_pool().await);
        let now = Utc::now().timestamp();
        store.revoke_token(&entry("expired", now - 60)).await.unwrap();
        store.revoke_token(&entry("live", now + 3600)).await.unwrap();

        assert_eq!(prune_expired(&store).await.unwrap(), 1);
        assert!(!store.is_token_revoked("expired").await.unwrap());
        assert!(store.is_token_revoked("live").await.unwrap());
    }

    #[tokio::test]
    async fn test_background_task_prunes_on_first_tick() {
        let store = Arc::new(SqliteCredentialStore::new(memory_pool().await));
        store
            .revoke_token(&entry("expired", Utc::now().timestamp() - 60))
            .await
            .unwrap();

        let handle = start_blacklist_pruning(store.clone(), Duration::from_secs(3600));
        for _ in 0..50 {
            if !store.is_token_revoked("expired").await.unwrap() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert!(!store.is_token_revoked("expired").await.unwrap());
    }
}
