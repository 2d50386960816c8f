//! Email notifier trait.

use crate::error::Result;
use crate::types::{EventId, TicketId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Why a notification is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Purchase confirmed by the payment provider.
    TicketConfirmation,
    /// Complimentary ticket issued by an administrator.
    CompTicket,
}

/// Payload handed to the email collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketNotification {
    /// Why the notification is being sent.
    pub kind: NotificationKind,
    /// Ticket the notification is about.
    pub ticket_id: TicketId,
    /// Event the ticket admits to.
    pub event_id: EventId,
    /// Recipient email address.
    pub recipient: String,
    /// Admission token to render as a QR code.
    pub token: String,
    /// Recipient display name, when known.
    pub user_name: Option<String>,
    /// Event name.
    pub event_name: String,
    /// Event start.
    pub event_date: DateTime<Utc>,
    /// Event venue.
    pub event_location: String,
}

/// Email collaborator.
///
/// Invoked fire-and-forget: a delivery failure must never roll back the
/// ticket transition that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a ticket notification.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Notification`] if delivery fails; callers log
    /// and continue.
    async fn notify(&self, notification: TicketNotification) -> Result<()>;
}
