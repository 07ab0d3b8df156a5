//! Durable store of verified identities (source of truth).

mod postgres;

pub use postgres::PgIdentityStore;

use std::future::Future;

use vouch_common::{IdentityId, Result, VerifiedIdentity};

/// Authoritative record of who is verified.
///
/// Implementations never touch the existence cache; mirroring is the
/// caller's job.
pub trait IdentityStore: Send + Sync {
    /// Fails with `AlreadyExists` or `StoreUnavailable`
    fn create(&self, id: &IdentityId) -> impl Future<Output = Result<VerifiedIdentity>> + Send;

    /// Fails with `NotFound` or `StoreUnavailable`
    fn delete(&self, id: &IdentityId) -> impl Future<Output = Result<()>> + Send;

    /// All records, oldest first
    fn list_all(&self) -> impl Future<Output = Result<Vec<VerifiedIdentity>>> + Send;
}
