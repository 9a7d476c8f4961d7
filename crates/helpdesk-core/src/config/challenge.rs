//! Human-verification challenge configuration.

use serde::{Deserialize, Serialize};

/// Which challenge variant gates the login form, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeMode {
    /// No challenge.
    #[default]
    None,
    /// Locally generated numeric image challenge.
    Image,
    /// Third-party verification service (reCAPTCHA-style siteverify).
    External,
}

/// Challenge gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Selected challenge variant.
    #[serde(default)]
    pub mode: ChallengeMode,
    /// Server-side secret mixed into image-challenge checksums so a stored
    /// checksum cannot be reversed into the expected answer.
    #[serde(default)]
    pub checksum_secret: String,
    /// Verification endpoint for the external variant.
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Shared secret sent to the external verification service.
    #[serde(default)]
    pub verify_secret: String,
    /// Timeout for the external verification call in seconds.
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_seconds: u64,
}

fn default_verify_url() -> String {
    "https://challenge.example.com/siteverify".to_string()
}

fn default_verify_timeout() -> u64 {
    5
}
