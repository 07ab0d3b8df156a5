//! # Vouch Common
//!
//! Shared types, errors, and constants used across Vouch components.
//!
//! ## Modules
//! - `types` - Core data structures (VerifiedIdentity, Challenge, outcomes)
//! - `error` - Common error type
//! - `constants` - Shared configuration constants and user-facing text

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Result, VouchError};
pub use types::*;
