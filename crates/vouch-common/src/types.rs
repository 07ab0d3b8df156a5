//! Core types shared across Vouch components.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::time::Duration;

use crate::constants::messages;

/// Opaque platform user identifier.
///
/// Discord snowflakes are carried as their decimal string form so the
/// store and cache never depend on the platform's integer width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for IdentityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A user who completed a challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Platform user identifier (primary key)
    pub id: IdentityId,

    /// When the challenge was completed. Never updated.
    pub verified_at: DateTime<Utc>,
}

impl VerifiedIdentity {
    pub fn new(id: IdentityId) -> Self {
        Self {
            id,
            verified_at: Utc::now(),
        }
    }
}

/// One in-flight verification attempt. Lives only in memory.
#[derive(Debug, Clone)]
pub struct Challenge {
    /// The code the user must send back
    pub code: String,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// When the reply window closes
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(code: String, wait: Duration) -> Self {
        let issued_at = Utc::now();
        let window = TimeDelta::from_std(wait).unwrap_or(TimeDelta::MAX);
        let expires_at = issued_at
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            code,
            issued_at,
            expires_at,
        }
    }

    /// Length a reply must have to be considered an answer
    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Exact comparison: no trimming, no case folding
    pub fn matches(&self, reply: &str) -> bool {
        reply == self.code
    }

    /// Length of the reply window
    pub fn window(&self) -> Duration {
        (self.expires_at - self.issued_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Result of a `verify` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The cache already holds a marker for this user
    AlreadyVerified,
    /// The private channel could not be opened or written to
    Undeliverable,
    /// No reply arrived within the window
    TimedOut,
    /// A reply arrived but differed from the code
    WrongCode,
    /// Reply matched; record and cache entry written
    Verified,
}

impl VerifyOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadyVerified => messages::ALREADY_VERIFIED,
            Self::Undeliverable => messages::UNDELIVERABLE,
            Self::TimedOut => messages::TIMED_OUT,
            Self::WrongCode => messages::WRONG_CODE,
            Self::Verified => messages::VERIFIED,
        }
    }
}

/// Result of an `unverify` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnverifyOutcome {
    /// No cache marker; nothing was deleted
    NotVerified,
    /// Record and cache entry removed
    Unverified,
}

impl UnverifyOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotVerified => messages::INVALID_USER,
            Self::Unverified => messages::UNVERIFIED,
        }
    }
}
