//! Redis-backed existence cache.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use vouch_common::constants::redis_keys::{VERIFIED_PATTERN, VERIFIED_PREFIX};
use vouch_common::{IdentityId, Result, VouchError};

use super::ExistenceCache;

/// Verified markers stored as `verified:{id} = 1`
#[derive(Clone)]
pub struct RedisCache {
    /// Auto-reconnecting connection, cloned per call
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Round-trip a PING, for readiness checks
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

fn key(id: &IdentityId) -> String {
    format!("{}{}", VERIFIED_PREFIX, id)
}

fn id_from_key(key: &str) -> Option<IdentityId> {
    key.strip_prefix(VERIFIED_PREFIX)
        .filter(|id| !id.is_empty())
        .map(IdentityId::from)
}

fn unavailable(e: redis::RedisError) -> VouchError {
    VouchError::CacheUnavailable(e.to_string())
}

impl ExistenceCache for RedisCache {
    async fn exists(&self, id: &IdentityId) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.exists(key(id)).await.map_err(unavailable)
    }

    async fn add(&self, id: &IdentityId) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key(id), 1).await.map_err(unavailable)
    }

    async fn remove(&self, id: &IdentityId) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key(id)).await.map_err(unavailable)
    }

    async fn members(&self) -> Result<Vec<IdentityId>> {
        let mut conn = self.conn.clone();
        // KEYS is fine here: only called once, before the bot takes commands
        let keys: Vec<String> = conn.keys(VERIFIED_PATTERN).await.map_err(unavailable)?;
        Ok(keys.iter().filter_map(|k| id_from_key(k)).collect())
    }
}
