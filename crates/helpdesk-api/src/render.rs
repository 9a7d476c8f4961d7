//! Challenge image rendering seam.
//!
//! Drawing the numeric code into an image lives outside this subsystem;
//! deployments plug a renderer in here. The code itself must never reach
//! the client as text — only the rendered image does.

use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;

/// A rendered challenge image ready to serve.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// MIME type of the image bytes.
    pub content_type: &'static str,
    /// Encoded image data.
    pub bytes: Vec<u8>,
}

/// Turns a challenge code into an image response body.
pub trait ChallengeImageRenderer: Send + Sync + std::fmt::Debug {
    fn render(&self, code: &str) -> AppResult<RenderedImage>;
}

/// Placeholder for deployments that enabled the image challenge without
/// wiring a renderer. Always errors, so misconfiguration surfaces loudly
/// instead of silently serving an unsolvable form.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredRenderer;

impl ChallengeImageRenderer for UnconfiguredRenderer {
    fn render(&self, _code: &str) -> AppResult<RenderedImage> {
        Err(AppError::configuration(
            "No challenge image renderer is configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use helpdesk_core::error::ErrorKind;

    #[test]
    fn unconfigured_renderer_refuses_to_render() {
        let err = UnconfiguredRenderer.render("12345").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
