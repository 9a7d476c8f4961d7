//! Locally generated numeric image challenge.
//!
//! The session never stores the expected answer, only a keyed SHA-256
//! checksum of it. Rendering the code into an actual image is an external
//! collaborator's job; this module issues codes and checks answers.

use rand::Rng;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::token;

/// Number of digits in a generated challenge code.
const CODE_DIGITS: u32 = 5;

/// Issues numeric challenge codes and verifies submitted answers.
#[derive(Debug, Clone)]
pub struct ImageChallenge {
    secret: String,
}

impl ImageChallenge {
    /// Creates a challenge issuer keyed with the given secret.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    /// Generate a fresh numeric code and the checksum to store for it.
    pub fn issue(&self) -> (String, String) {
        let upper = 10u32.pow(CODE_DIGITS);
        let code = format!(
            "{:0width$}",
            OsRng.gen_range(0..upper),
            width = CODE_DIGITS as usize
        );
        let checksum = self.checksum(&code);
        (code, checksum)
    }

    /// Keyed checksum of an answer.
    pub fn checksum(&self, answer: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(answer.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Constant-time check of a submitted answer against a stored checksum.
    pub fn verify(&self, stored_checksum: &str, answer: &str) -> bool {
        token::constant_time_eq(stored_checksum, &self.checksum(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_code_verifies_against_its_checksum() {
        let challenge = ImageChallenge::new("k");
        let (code, checksum) = challenge.issue();
        assert_eq!(code.len(), CODE_DIGITS as usize);
        assert!(challenge.verify(&checksum, &code));
        assert!(!challenge.verify(&checksum, "00000x"));
    }

    #[test]
    fn checksum_is_keyed() {
        let a = ImageChallenge::new("key-a").checksum("12345");
        let b = ImageChallenge::new("key-b").checksum("12345");
        assert_ne!(a, b);
    }
}
