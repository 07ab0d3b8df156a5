//! Application state and shared resources.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use std::sync::Arc;

use crate::cache::RedisCache;
use crate::config::AppConfig;
use crate::service::VerificationService;
use crate::store::PgIdentityStore;

/// Production wiring of the verification service
pub type Verifier = VerificationService<RedisCache, PgIdentityStore>;

/// Shared application state, handed to every command
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Verify / unverify orchestration over Redis and PostgreSQL
    pub verification: Arc<Verifier>,
}

impl AppState {
    /// Connect to Redis and PostgreSQL and run migrations
    pub async fn connect(config: AppConfig) -> Result<Self> {
        // Connect to Redis with connection manager (handles reconnection)
        let client = redis::Client::open(config.redis_url.as_str())
            .context("Failed to create Redis client")?;

        let redis = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        let store = PgIdentityStore::connect(&config.database_url, config.database_max_connections)
            .await
            .context("Failed to connect to PostgreSQL")?;

        store
            .migrate()
            .await
            .context("Failed to run database migrations")?;

        let verification = Arc::new(VerificationService::new(
            RedisCache::new(redis),
            store,
            &config.verification,
        ));

        Ok(Self {
            config,
            verification,
        })
    }

    /// Check that both backends answer
    pub async fn ready(&self) -> (bool, bool) {
        let redis = self.verification.cache().ping().await.is_ok();
        let database = self.verification.store().ping().await.is_ok();
        (redis, database)
    }
}
