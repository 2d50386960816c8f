//! Console notifier for development.

use crate::error::Result;
use crate::providers::email::{Notifier, TicketNotification};
use async_trait::async_trait;

/// Notifier that logs deliveries instead of sending email.
///
/// Useful for development and demos; swap in a real transport behind the
/// same trait for production.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Creates a console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: TicketNotification) -> Result<()> {
        tracing::info!(
            kind = ?notification.kind,
            ticket_id = %notification.ticket_id,
            event_id = %notification.event_id,
            recipient = %notification.recipient,
            event_name = %notification.event_name,
            "ticket notification (console delivery)"
        );
        Ok(())
    }
}
