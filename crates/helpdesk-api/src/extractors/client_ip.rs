//! Client network address extraction.
//!
//! Throttling keys on the peer address of the TCP connection only.
//! Forwarding headers are spoofable and deliberately ignored; deployments
//! behind a proxy terminate it in front of this service.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use helpdesk_core::error::AppError;

/// The peer address of the requesting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| ClientIp(info.0.ip()))
            .ok_or_else(|| AppError::internal("Peer address unavailable"))
    }
}
