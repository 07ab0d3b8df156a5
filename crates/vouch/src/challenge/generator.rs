//! One-time code generation.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::Duration;

use vouch_common::Challenge;
use vouch_common::constants::MAX_CODE_LENGTH;

/// Issues challenges with codes cut from a SHA-256 digest
pub struct CodeGenerator {
    /// Number of hex characters in each code
    code_length: usize,
    /// Reply window given with each challenge
    wait: Duration,
}

impl CodeGenerator {
    pub fn new(code_length: usize, wait: Duration) -> Self {
        Self {
            code_length: code_length.clamp(1, MAX_CODE_LENGTH),
            wait,
        }
    }

    /// Issue a fresh challenge
    pub fn issue(&self) -> Challenge {
        Challenge::new(self.generate_code(), self.wait)
    }

    /// Hash random entropy together with the current time.
    ///
    /// Collisions are only statistically improbable; codes are not tracked.
    fn generate_code(&self) -> String {
        let entropy: u64 = rand::rng().random();
        let seed = format!("{}:{}", entropy, Utc::now().timestamp_millis());
        let digest = Sha256::digest(seed.as_bytes());

        let mut code: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        code.truncate(self.code_length);
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length_and_alphabet() {
        let generator = CodeGenerator::new(8, Duration::from_secs(10));
        let challenge = generator.issue();

        assert_eq!(challenge.code.len(), 8);
        assert!(challenge.code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(challenge.window(), Duration::from_secs(10));
    }

    #[test]
    fn test_full_digest_length() {
        let generator = CodeGenerator::new(MAX_CODE_LENGTH, Duration::from_secs(10));
        assert_eq!(generator.issue().code.len(), 64);
    }

    #[test]
    fn test_length_is_clamped() {
        assert_eq!(CodeGenerator::new(0, Duration::from_secs(1)).issue().code.len(), 1);
        assert_eq!(CodeGenerator::new(500, Duration::from_secs(1)).issue().code.len(), 64);
    }

    #[test]
    fn test_codes_differ() {
        let generator = CodeGenerator::new(16, Duration::from_secs(10));
        let a = generator.issue();
        let b = generator.issue();
        assert_ne!(a.code, b.code);
    }
}
