//! Common error types for Vouch components.

use thiserror::Error;

/// Common errors across Vouch components
#[derive(Debug, Error)]
pub enum VouchError {
    /// Existence cache (Redis) unreachable or failing
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Durable store (PostgreSQL) unreachable or failing
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A record for this identity already exists
    #[error("Identity already exists: {0}")]
    AlreadyExists(String),

    /// No record for this identity
    #[error("Identity not found: {0}")]
    NotFound(String),

    /// Chat platform rejected or failed a message
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// A collaborator reported success with an inconsistent result
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl VouchError {
    /// Returns true if an external collaborator (cache, store, chat platform) failed
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::CacheUnavailable(_) | Self::StoreUnavailable(_) | Self::Delivery(_)
        )
    }

    /// Short label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CacheUnavailable(_) => "cache",
            Self::StoreUnavailable(_) => "store",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::Delivery(_) => "delivery",
            Self::Invariant(_) => "invariant",
        }
    }
}

pub type Result<T> = std::result::Result<T, VouchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_failures() {
        assert!(VouchError::CacheUnavailable("down".into()).is_collaborator_failure());
        assert!(VouchError::StoreUnavailable("down".into()).is_collaborator_failure());
        assert!(VouchError::Delivery("dm closed".into()).is_collaborator_failure());
        assert!(!VouchError::AlreadyExists("U1".into()).is_collaborator_failure());
        assert!(!VouchError::Invariant("empty row".into()).is_collaborator_failure());
    }

    #[test]
    fn kinds_name_the_failing_collaborator() {
        assert_eq!(VouchError::CacheUnavailable("down".into()).kind(), "cache");
        assert_eq!(VouchError::StoreUnavailable("down".into()).kind(), "store");
        assert_eq!(VouchError::Delivery("dm closed".into()).kind(), "delivery");
        assert_eq!(VouchError::NotFound("U1".into()).kind(), "not_found");
    }
}
