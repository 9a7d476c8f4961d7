//! Ticket domain entities (narrow interface for auto-closure).

pub mod model;
pub mod status;

pub use model::Ticket;
pub use status::{Closable, TicketStatus};
