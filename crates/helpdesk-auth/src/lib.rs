//! # helpdesk-auth
//!
//! Authentication and session security for the helpdesk staff area.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and verification
//! - `token` — opaque token generation, hashing, constant-time comparison
//! - `session` — server-side session lifecycle (CSRF, regeneration, identity)
//! - `limiter` — per-address brute-force throttling and the permanent deny-list
//! - `challenge` — human-verification gate (image and external variants)
//! - `remember` — remember-me cookie token derivation
//! - `login` — the login flow state machine
//! - `store` — persistence seams backed by the database repositories

pub mod challenge;
pub mod limiter;
pub mod login;
pub mod password;
pub mod remember;
pub mod session;
pub mod store;
pub mod token;

pub use challenge::ChallengeGate;
pub use limiter::{BruteForceLimiter, LimiterDecision};
pub use login::{FieldError, FormField, LoginFlow, LoginForm, LoginOutcome};
pub use password::PasswordHasher;
pub use session::SessionManager;
