//! Authenticated session introspection.

use axum::Json;

use crate::dto::response::{ApiResponse, StaffSummary};
use crate::extractors::AuthStaff;

/// GET /admin/session
pub async fn whoami(auth: AuthStaff) -> Json<ApiResponse<StaffSummary>> {
    Json(ApiResponse::ok(StaffSummary::from(&auth.user)))
}
