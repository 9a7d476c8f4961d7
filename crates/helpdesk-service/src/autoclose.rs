//! Login-triggered stale-ticket auto-closure.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use helpdesk_core::config::AutoCloseConfig;
use helpdesk_core::result::AppResult;
use helpdesk_database::repositories::{AuditRepository, TicketRepository};
use helpdesk_entity::audit::CreateAuditEvent;
use helpdesk_entity::ticket::{Ticket, TicketStatus};

/// Ticket operations the closer needs, behind a seam so the closure
/// logic can run against in-memory stores.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// The status tickets enter after a staff reply, if one is flagged.
    async fn find_default_staff_reply_status(&self) -> AppResult<Option<TicketStatus>>;
    /// The status auto-closed tickets are moved into, if one is flagged.
    async fn find_autoclose_status(&self) -> AppResult<Option<TicketStatus>>;
    /// Close every stale ticket, returning exactly the rows that moved.
    async fn close_stale(
        &self,
        from_status: i32,
        to_status: i32,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Ticket>>;
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn find_default_staff_reply_status(&self) -> AppResult<Option<TicketStatus>> {
        TicketRepository::find_default_staff_reply_status(self).await
    }

    async fn find_autoclose_status(&self) -> AppResult<Option<TicketStatus>> {
        TicketRepository::find_autoclose_status(self).await
    }

    async fn close_stale(
        &self,
        from_status: i32,
        to_status: i32,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Ticket>> {
        TicketRepository::close_stale(self, from_status, to_status, cutoff).await
    }
}

/// Where closure events are recorded.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: &CreateAuditEvent) -> AppResult<()>;
}

#[async_trait]
impl AuditSink for AuditRepository {
    async fn record(&self, event: &CreateAuditEvent) -> AppResult<()> {
        AuditRepository::append(self, event).await.map(|_| ())
    }
}

/// Closes tickets that sat in the "awaiting customer" status for too long.
///
/// Runs opportunistically after a successful staff login. Callers treat a
/// failed run as a logged non-event; it never blocks the login itself.
#[derive(Clone)]
pub struct AutoCloseService {
    tickets: Arc<dyn TicketStore>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn crate::CustomerNotifier>,
    config: AutoCloseConfig,
}

impl std::fmt::Debug for AutoCloseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCloseService")
            .field("config", &self.config)
            .finish()
    }
}

impl AutoCloseService {
    /// Creates the service.
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn crate::CustomerNotifier>,
        config: AutoCloseConfig,
    ) -> Self {
        Self {
            tickets,
            audit,
            notifier,
            config,
        }
    }

    /// Close every eligible stale ticket. Returns how many were closed.
    ///
    /// The conditional UPDATE claims the rows first; audit records and
    /// customer notifications are written only for the returned set, so
    /// concurrent runs never log the same closure twice.
    pub async fn run(&self) -> AppResult<u64> {
        if !self.config.enabled() {
            return Ok(0);
        }

        let Some(source) = self.tickets.find_default_staff_reply_status().await? else {
            warn!("Auto-close enabled but no default staff reply status is flagged");
            return Ok(0);
        };
        if !source.closable.by_system() {
            info!(
                status_id = source.id,
                "Default staff reply status is not system-closable; skipping auto-close"
            );
            return Ok(0);
        }
        let Some(target) = self.tickets.find_autoclose_status().await? else {
            warn!("Auto-close enabled but no auto-close target status is flagged");
            return Ok(0);
        };

        let cutoff = Utc::now() - Duration::days(self.config.days);
        let closed = self.tickets.close_stale(source.id, target.id, cutoff).await?;
        if closed.is_empty() {
            return Ok(0);
        }

        for ticket in &closed {
            // Best-effort per ticket: one bad row must not hide the rest.
            if let Err(e) = self
                .audit
                .record(&CreateAuditEvent::ticket_autoclosed(
                    ticket.id,
                    &ticket.tracking_id,
                ))
                .await
            {
                error!(
                    ticket_id = ticket.id,
                    error = %e,
                    "Failed to record automatic closure in the audit trail"
                );
            }

            if self.config.notify_customers {
                if let Err(e) = self.notifier.ticket_autoclosed(ticket).await {
                    error!(
                        ticket_id = ticket.id,
                        error = %e,
                        "Failed to notify customer of automatic closure"
                    );
                }
            }
        }

        let count = closed.len() as u64;
        info!(closed = count, cutoff = %cutoff, "Auto-closed stale tickets");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use helpdesk_core::error::AppError;
    use helpdesk_entity::ticket::model::SYSTEM_ACTOR;
    use helpdesk_entity::ticket::status::Closable;

    use crate::NoopNotifier;

    struct MemTickets {
        source: Option<TicketStatus>,
        target: Option<TicketStatus>,
        open: Mutex<Vec<Ticket>>,
    }

    #[async_trait]
    impl TicketStore for MemTickets {
        async fn find_default_staff_reply_status(&self) -> AppResult<Option<TicketStatus>> {
            Ok(self.source.clone())
        }

        async fn find_autoclose_status(&self) -> AppResult<Option<TicketStatus>> {
            Ok(self.target.clone())
        }

        async fn close_stale(
            &self,
            from_status: i32,
            to_status: i32,
            cutoff: DateTime<Utc>,
        ) -> AppResult<Vec<Ticket>> {
            let mut open = self.open.lock().unwrap();
            let (claimed, rest): (Vec<Ticket>, Vec<Ticket>) = open
                .drain(..)
                .partition(|t| t.status == from_status && t.last_change <= cutoff);
            *open = rest;
            Ok(claimed
                .into_iter()
                .map(|mut t| {
                    t.status = to_status;
                    t.closed_at = Some(Utc::now());
                    t.closed_by = Some(SYSTEM_ACTOR);
                    t
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct MemAudit(Mutex<Vec<CreateAuditEvent>>);

    #[async_trait]
    impl AuditSink for MemAudit {
        async fn record(&self, event: &CreateAuditEvent) -> AppResult<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl crate::CustomerNotifier for FailingNotifier {
        async fn ticket_autoclosed(&self, _ticket: &Ticket) -> AppResult<()> {
            Err(AppError::external_service("Mail relay unavailable"))
        }
    }

    fn status(id: i32, closable: Closable, staff_reply: bool, autoclose: bool) -> TicketStatus {
        TicketStatus {
            id,
            closable,
            is_default_staff_reply: staff_reply,
            is_autoclose_option: autoclose,
        }
    }

    fn ticket(id: i64, status: i32, age_days: i64) -> Ticket {
        Ticket {
            id,
            tracking_id: format!("TRK-{id:03}"),
            status,
            owner_email: "customer@example.com".to_string(),
            subject: "Printer on fire".to_string(),
            last_change: Utc::now() - Duration::days(age_days),
            closed_at: None,
            closed_by: None,
        }
    }

    fn service(
        tickets: MemTickets,
        audit: Arc<MemAudit>,
        notifier: Arc<dyn crate::CustomerNotifier>,
        days: i64,
        notify: bool,
    ) -> AutoCloseService {
        AutoCloseService::new(
            Arc::new(tickets),
            audit,
            notifier,
            AutoCloseConfig {
                days,
                notify_customers: notify,
            },
        )
    }

    fn stores(stale: Vec<Ticket>) -> (MemTickets, Arc<MemAudit>) {
        let tickets = MemTickets {
            source: Some(status(2, Closable::StaffOnly, true, false)),
            target: Some(status(3, Closable::Yes, false, true)),
            open: Mutex::new(stale),
        };
        (tickets, Arc::new(MemAudit::default()))
    }

    #[tokio::test]
    async fn disabled_config_is_a_noop() {
        let (tickets, audit) = stores(vec![ticket(1, 2, 60)]);
        let service = service(tickets, Arc::clone(&audit), Arc::new(NoopNotifier), 0, false);
        assert_eq!(service.run().await.unwrap(), 0);
        assert!(audit.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn audits_exactly_the_claimed_tickets_once() {
        let (tickets, audit) = stores(vec![ticket(1, 2, 60), ticket(2, 2, 45), ticket(3, 2, 1)]);
        let service = service(tickets, Arc::clone(&audit), Arc::new(NoopNotifier), 30, false);

        assert_eq!(service.run().await.unwrap(), 2);
        {
            let events = audit.0.lock().unwrap();
            assert_eq!(events.len(), 2);
            assert!(events.iter().all(|e| e.event_key == "ticket.autoclosed"));
        }

        // A second run finds nothing left to claim and logs nothing new.
        assert_eq!(service.run().await.unwrap(), 0);
        assert_eq!(audit.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn customer_only_source_status_is_skipped() {
        let tickets = MemTickets {
            source: Some(status(2, Closable::CustomerOnly, true, false)),
            target: Some(status(3, Closable::Yes, false, true)),
            open: Mutex::new(vec![ticket(1, 2, 60)]),
        };
        let audit = Arc::new(MemAudit::default());
        let service = service(tickets, Arc::clone(&audit), Arc::new(NoopNotifier), 30, false);

        assert_eq!(service.run().await.unwrap(), 0);
        assert!(audit.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn notifier_failure_does_not_abort_the_run() {
        let (tickets, audit) = stores(vec![ticket(1, 2, 60), ticket(2, 2, 45)]);
        let service = service(tickets, Arc::clone(&audit), Arc::new(FailingNotifier), 30, true);

        assert_eq!(service.run().await.unwrap(), 2);
        assert_eq!(audit.0.lock().unwrap().len(), 2);
    }
}
