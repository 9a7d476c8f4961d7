//! Opaque token generation, hashing, and comparison primitives.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Number of random bytes in an opaque token (hex-encoded to 64 chars).
const TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque token from the OS random source.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 of a token, hex-encoded. Only hashes are persisted; a leaked
/// table never yields usable cookie values.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Constant-time string equality. Differing lengths compare unequal
/// without an early return on content.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Tag binding a session to the account's current credential state.
///
/// Recomputed on every authenticated request; changing the password
/// changes the tag and invalidates every session that carries the old one.
pub fn verify_tag(username: &str, password_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password_hash.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_fixed_length() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), TOKEN_BYTES * 2);
    }

    #[test]
    fn hash_is_stable_and_distinct_from_input() {
        let raw = generate_token();
        assert_eq!(hash_token(&raw), hash_token(&raw));
        assert_ne!(hash_token(&raw), raw);
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(!constant_time_eq("", "a"));
    }

    #[test]
    fn verify_tag_tracks_credential_changes() {
        let before = verify_tag("alice", "$argon2id$old");
        let after = verify_tag("alice", "$argon2id$new");
        assert_ne!(before, after);
        assert_eq!(before, verify_tag("alice", "$argon2id$old"));
    }
}
