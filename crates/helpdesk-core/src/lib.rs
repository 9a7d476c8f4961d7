//! # helpdesk-core
//!
//! Shared foundation for the helpdesk: configuration schemas, the unified
//! [`AppError`] type, and the localized message catalog used for every
//! user-visible string.

pub mod config;
pub mod error;
pub mod messages;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
