//! Third-party challenge verification (siteverify-style endpoint).

use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

use helpdesk_core::config::ChallengeConfig;
use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;

/// Response body of a siteverify-style endpoint.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

/// Client for the external challenge verification service.
#[derive(Debug, Clone)]
pub struct ExternalVerifier {
    client: reqwest::Client,
    url: String,
    secret: String,
}

impl ExternalVerifier {
    /// Build a verifier from configuration.
    pub fn new(config: &ChallengeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.verify_timeout_seconds))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: config.verify_url.clone(),
            secret: config.verify_secret.clone(),
        }
    }

    /// Ask the service whether the response token is valid for this client.
    pub async fn verify(&self, response_token: &str, remote_ip: IpAddr) -> AppResult<bool> {
        let remote_ip = remote_ip.to_string();
        let params = [
            ("secret", self.secret.as_str()),
            ("response", response_token),
            ("remoteip", remote_ip.as_str()),
        ];

        let reply = self
            .client
            .post(&self.url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Challenge verification request failed",
                    e,
                )
            })?;

        let body: VerifyResponse = reply.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Challenge verification response malformed",
                e,
            )
        })?;

        Ok(body.success)
    }
}
