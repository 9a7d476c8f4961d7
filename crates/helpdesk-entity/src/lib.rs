//! # helpdesk-entity
//!
//! Domain entity models for the helpdesk. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod attempt;
pub mod audit;
pub mod banned;
pub mod session;
pub mod ticket;
pub mod user;
