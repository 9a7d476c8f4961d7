//! # helpdesk-api
//!
//! HTTP API layer for the helpdesk staff area: the `/admin/login` action
//! dispatch, cookie construction, client address extraction, the
//! authenticated-staff extractor, and the `AppError` → HTTP mapping.

pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod render;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
