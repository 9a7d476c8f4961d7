//! The staff login flow.

pub mod flow;
pub mod form;

pub use flow::{LoginFlow, LoginOutcome};
pub use form::{FieldError, FormField, LoginForm, sanitize_redirect};
