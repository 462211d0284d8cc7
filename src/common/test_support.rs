//! Shared fixtures for in-crate tests

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

use super::config::{test_values, AppConfig};
use super::migrations::run_migrations;
use super::state::AppState;
use crate::auth::store::SqliteCredentialStore;
use crate::services::mailer::{MailError, Mailer, OutboundMail};

/// Single-connection in-memory database with the schema applied.
///
/// Every `sqlite::memory:` connection is its own database, so the pool is capped at one.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub fn test_config() -> AppConfig {
    let values = test_values();
    AppConfig::from_source(|k| values.get(k).map(|v| v.to_string())).unwrap()
}

/// Mailer that keeps every message for inspection
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

pub struct TestContext {
    pub state: Arc<AppState>,
    pub pool: SqlitePool,
    pub store: Arc<SqliteCredentialStore>,
    pub mailer: Arc<RecordingMailer>,
    pub config: AppConfig,
}

pub async fn test_context() -> TestContext {
    let config = test_config();
    let pool = memory_pool().await;
    let store = Arc::new(SqliteCredentialStore::new(pool.clone()));
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(&config, store.clone(), mailer.clone()).unwrap();

    TestContext {
        state: Arc::new(state),
        pool,
        store,
        mailer,
        config,
    }
}
