//! HTTP handlers.

pub mod health;
pub mod login;
pub mod session;
