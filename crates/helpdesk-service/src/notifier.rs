//! Outbound customer notification seam.
//!
//! Actual mail transport lives outside this subsystem; the closer only
//! needs somewhere to hand a "your ticket was closed" event.

use async_trait::async_trait;
use tracing::debug;

use helpdesk_core::result::AppResult;
use helpdesk_entity::ticket::Ticket;

/// Notifies a customer that something happened to their ticket.
#[async_trait]
pub trait CustomerNotifier: Send + Sync {
    /// Tell the ticket owner their ticket was closed automatically.
    async fn ticket_autoclosed(&self, ticket: &Ticket) -> AppResult<()>;
}

/// Notifier that records the intent and does nothing else. Used when
/// customer notifications are disabled and in tests.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl CustomerNotifier for NoopNotifier {
    async fn ticket_autoclosed(&self, ticket: &Ticket) -> AppResult<()> {
        debug!(
            ticket_id = ticket.id,
            tracking_id = %ticket.tracking_id,
            "Customer notification suppressed (noop notifier)"
        );
        Ok(())
    }
}
