//! Request extractors.

pub mod client_ip;
pub mod staff;

pub use client_ip::ClientIp;
pub use staff::AuthStaff;
