//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse` impl lives in `helpdesk-core` next to `AppError`
//! (the orphan rule forbids implementing it here); this module re-exports
//! the standard error response body for handler use.

pub use helpdesk_core::error::ApiErrorResponse;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use helpdesk_core::error::AppError;

    #[test]
    fn credential_failures_map_to_unauthorized() {
        let resp = AppError::invalid_credentials("nope").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn throttling_maps_to_too_many_requests() {
        let resp = AppError::rate_limited("slow down").into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
