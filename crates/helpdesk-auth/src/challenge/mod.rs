//! Human-verification challenge gate.

pub mod external;
pub mod image;

use std::net::IpAddr;

use tracing::error;

use helpdesk_core::config::{ChallengeConfig, ChallengeMode};
use helpdesk_core::result::AppResult;
use helpdesk_entity::session::Session;

pub use external::ExternalVerifier;
pub use image::ImageChallenge;

/// Outcome of checking a submitted challenge answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeVerdict {
    /// No challenge is configured, or the session already passed one.
    NotRequired,
    /// The answer checks out.
    Passed,
    /// A challenge is required but no answer was submitted.
    MissingAnswer,
    /// The answer is wrong (or the verification service said no).
    Failed,
}

/// The configured challenge variant guarding the login form.
#[derive(Debug, Clone)]
pub enum ChallengeGate {
    /// No challenge.
    Disabled,
    /// Locally generated numeric image challenge.
    Image(ImageChallenge),
    /// Third-party verification service.
    External(ExternalVerifier),
}

impl ChallengeGate {
    /// Build the gate from configuration.
    pub fn from_config(config: &ChallengeConfig) -> Self {
        match config.mode {
            ChallengeMode::None => Self::Disabled,
            ChallengeMode::Image => Self::Image(ImageChallenge::new(&config.checksum_secret)),
            ChallengeMode::External => Self::External(ExternalVerifier::new(config)),
        }
    }

    /// Whether a login render needs a challenge for this session.
    pub fn required(&self, session: &Session) -> bool {
        !matches!(self, Self::Disabled) && !session.challenge_verified
    }

    /// Check the submitted answer against the session's pending challenge.
    ///
    /// A session that already carries a passed challenge skips verification
    /// entirely. A transport failure talking to the external service is
    /// logged and treated as a failed challenge.
    pub async fn verify(
        &self,
        session: &Session,
        answer: Option<&str>,
        ip: IpAddr,
    ) -> AppResult<ChallengeVerdict> {
        if session.challenge_verified {
            return Ok(ChallengeVerdict::NotRequired);
        }

        match self {
            Self::Disabled => Ok(ChallengeVerdict::NotRequired),
            Self::Image(image) => {
                let answer = match answer {
                    Some(a) if !a.trim().is_empty() => a.trim(),
                    _ => return Ok(ChallengeVerdict::MissingAnswer),
                };
                let Some(expected) = &session.challenge_checksum else {
                    // Nothing was issued for this session.
                    return Ok(ChallengeVerdict::Failed);
                };
                if image.verify(expected, answer) {
                    Ok(ChallengeVerdict::Passed)
                } else {
                    Ok(ChallengeVerdict::Failed)
                }
            }
            Self::External(verifier) => {
                let answer = match answer {
                    Some(a) if !a.is_empty() => a,
                    _ => return Ok(ChallengeVerdict::MissingAnswer),
                };
                match verifier.verify(answer, ip).await {
                    Ok(true) => Ok(ChallengeVerdict::Passed),
                    Ok(false) => Ok(ChallengeVerdict::Failed),
                    Err(e) => {
                        error!(error = %e, "Challenge verification service unreachable");
                        Ok(ChallengeVerdict::Failed)
                    }
                }
            }
        }
    }
}
