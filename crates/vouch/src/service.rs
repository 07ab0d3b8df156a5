//! Verify / unverify orchestration.
//!
//! Ties the challenge flow to the existence cache and the durable store.
//! Writes go to the store first and are then mirrored into the cache
//! (write-through); nothing spans both atomically and nothing is retried.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use vouch_common::constants::COUNTDOWN_STEPS;
use vouch_common::{
    IdentityId, Result, UnverifyOutcome, VerifiedIdentity, VerifyOutcome, VouchError,
};

use crate::cache::ExistenceCache;
use crate::challenge::{CodeGenerator, PrivateChannel, await_reply};
use crate::config::VerificationConfig;
use crate::store::IdentityStore;

/// Result of reconciling the cache with the store at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheSync {
    /// Durable records seen
    pub records: usize,
    /// Markers that were missing and got added
    pub restored: usize,
    /// Markers with no durable record that got removed
    pub pruned: usize,
}

/// Verification service, generic over its collaborators so tests can
/// substitute in-memory fakes
pub struct VerificationService<C, S> {
    cache: C,
    store: S,
    generator: CodeGenerator,
}

impl<C, S> VerificationService<C, S>
where
    C: ExistenceCache,
    S: IdentityStore,
{
    pub fn new(cache: C, store: S, settings: &VerificationConfig) -> Self {
        Self {
            cache,
            store,
            generator: CodeGenerator::new(settings.code_length, settings.wait()),
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Make the cache mirror the store exactly
    pub async fn rebuild_cache(&self) -> Result<CacheSync> {
        let records = self.store.list_all().await?;
        let wanted: HashSet<IdentityId> = records.into_iter().map(|r| r.id).collect();

        let mut sync = CacheSync {
            records: wanted.len(),
            ..Default::default()
        };

        for id in &wanted {
            if !self.cache.exists(id).await? {
                self.cache.add(id).await?;
                sync.restored += 1;
            }
        }

        for id in self.cache.members().await? {
            if !wanted.contains(&id) {
                self.cache.remove(&id).await?;
                sync.pruned += 1;
            }
        }

        Ok(sync)
    }

    /// Run one verification attempt for `id` over `channel`
    pub async fn verify<P>(&self, id: &IdentityId, channel: &P) -> Result<VerifyOutcome>
    where
        P: PrivateChannel,
    {
        if self.cache.exists(id).await? {
            debug!(user_id = %id, "Already verified");
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        let challenge = self.generator.issue();
        let mut display = match channel.deliver(&challenge).await {
            Ok(display) => display,
            Err(e) => {
                warn!(user_id = %id, error = %e, "Could not deliver challenge");
                return Ok(VerifyOutcome::Undeliverable);
            }
        };

        debug!(
            user_id = %id,
            expires_at = %challenge.expires_at,
            "Challenge delivered"
        );

        // The code is already in the user's DMs; a lost acknowledgement is cosmetic
        if let Err(e) = channel.acknowledge().await {
            warn!(user_id = %id, error = %e, "Could not acknowledge command");
        }

        let Some(reply) = await_reply(channel, &mut display, &challenge, COUNTDOWN_STEPS).await
        else {
            info!(user_id = %id, "Challenge timed out");
            return Ok(VerifyOutcome::TimedOut);
        };

        if !challenge.matches(&reply) {
            info!(user_id = %id, "Wrong code entered");
            return Ok(VerifyOutcome::WrongCode);
        }

        if self.grant(id).await? {
            info!(user_id = %id, "User verified");
            Ok(VerifyOutcome::Verified)
        } else {
            // Another attempt for the same user finished first
            Ok(VerifyOutcome::AlreadyVerified)
        }
    }

    /// Remove the verification for `id`, if there is one
    pub async fn unverify(&self, id: &IdentityId) -> Result<UnverifyOutcome> {
        if self.revoke(id).await? {
            info!(user_id = %id, "User unverified");
            Ok(UnverifyOutcome::Unverified)
        } else {
            Ok(UnverifyOutcome::NotVerified)
        }
    }

    /// All durable records, oldest first
    pub async fn list(&self) -> Result<Vec<VerifiedIdentity>> {
        self.store.list_all().await
    }

    /// Create the record and cache marker unless `id` is already verified.
    ///
    /// Returns `false` when nothing was created. The cache is re-checked
    /// right before the write, and a store-level duplicate heals the cache.
    pub async fn grant(&self, id: &IdentityId) -> Result<bool> {
        if self.cache.exists(id).await? {
            return Ok(false);
        }

        match self.store.create(id).await {
            Ok(record) if record.id == *id => {
                self.cache.add(id).await?;
                Ok(true)
            }
            Ok(record) => Err(VouchError::Invariant(format!(
                "store created {} for {}",
                record.id, id
            ))),
            Err(VouchError::AlreadyExists(_)) => {
                warn!(user_id = %id, "Record existed without cache marker");
                self.cache.add(id).await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the record and cache marker if the cache says `id` is verified.
    ///
    /// Returns `false` when nothing was deleted.
    pub async fn revoke(&self, id: &IdentityId) -> Result<bool> {
        if !self.cache.exists(id).await? {
            return Ok(false);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.cache.remove(id).await?;
                Ok(true)
            }
            Err(VouchError::NotFound(_)) => {
                warn!(user_id = %id, "Cache marker had no record");
                self.cache.remove(id).await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
