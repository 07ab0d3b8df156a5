//! Existence cache: "is this user verified?" without touching PostgreSQL.

mod redis;

pub use self::redis::RedisCache;

use std::future::Future;

use vouch_common::{IdentityId, Result};

/// Presence-only key-value mirror of the durable store
pub trait ExistenceCache: Send + Sync {
    fn exists(&self, id: &IdentityId) -> impl Future<Output = Result<bool>> + Send;

    fn add(&self, id: &IdentityId) -> impl Future<Output = Result<()>> + Send;

    fn remove(&self, id: &IdentityId) -> impl Future<Output = Result<()>> + Send;

    /// Every identity currently marked, used when rebuilding at startup
    fn members(&self) -> impl Future<Output = Result<Vec<IdentityId>>> + Send;
}
