//! # helpdesk-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for all helpdesk entities.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
