//! # helpdesk-service
//!
//! Business logic services for the helpdesk. Each service orchestrates
//! repositories and collaborators to implement application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod autoclose;
pub mod notifier;

pub use autoclose::{AuditSink, AutoCloseService, TicketStore};
pub use notifier::{CustomerNotifier, NoopNotifier};
