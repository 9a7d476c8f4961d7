//! Repository implementations for all helpdesk entities.

pub mod attempt;
pub mod audit;
pub mod banned_ip;
pub mod session;
pub mod ticket;
pub mod user;

pub use attempt::AttemptRepository;
pub use audit::AuditRepository;
pub use banned_ip::BannedIpRepository;
pub use session::SessionRepository;
pub use ticket::TicketRepository;
pub use user::UserRepository;
