//! Ledger store abstraction.
//!
//! Durable keyed storage over the two entities (Event, Ticket) plus the
//! secondary lookup indexes. The store is the single source of truth: no
//! component holds a private mutable copy of a record, and every racy
//! transition goes through [`LedgerStore::transition_ticket`], the
//! conditional write that arbitrates concurrent callers.

pub mod memory;

pub use memory::MemoryLedger;

use crate::error::Result;
use crate::types::{Event, EventId, EventStatus, Ticket, TicketId, TicketStatus, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Fields settable by a conditional ticket transition.
///
/// Only the fields a forward transition may touch are representable;
/// everything else on the record is immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketChange {
    /// Target status.
    pub status: TicketStatus,
    /// Payment reference recorded on promotion.
    pub payment_intent_id: Option<String>,
    /// Admission token minted on promotion.
    pub admission_token: Option<String>,
    /// Admission timestamp recorded on check-in.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Admitting caller recorded on check-in.
    pub checked_in_by: Option<UserId>,
}

impl TicketChange {
    /// PENDING → VALID: attach the payment reference and admission token.
    #[must_use]
    pub const fn promote(payment_intent_id: String, admission_token: String) -> Self {
        Self {
            status: TicketStatus::Valid,
            payment_intent_id: Some(payment_intent_id),
            admission_token: Some(admission_token),
            checked_in_at: None,
            checked_in_by: None,
        }
    }

    /// VALID → USED: record when and by whom the ticket was admitted.
    #[must_use]
    pub const fn admit(at: DateTime<Utc>, by: UserId) -> Self {
        Self {
            status: TicketStatus::Used,
            payment_intent_id: None,
            admission_token: None,
            checked_in_at: Some(at),
            checked_in_by: Some(by),
        }
    }

    /// PENDING → CANCELLED: the payment session lapsed.
    #[must_use]
    pub const fn cancel() -> Self {
        Self {
            status: TicketStatus::Cancelled,
            payment_intent_id: None,
            admission_token: None,
            checked_in_at: None,
            checked_in_by: None,
        }
    }
}

/// Durable keyed storage for events and tickets.
///
/// Implementations must provide strong read-after-write consistency on
/// primary-key lookups, and index reads at least as fresh as the host store
/// guarantees. `transition_ticket` must be atomic: it succeeds only if the
/// record's current status matches the expected prior status at the moment
/// of write, and fails with no partial effect otherwise.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch an event by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>>;

    /// Write an event record, replacing any prior version.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn put_event(&self, event: &Event) -> Result<()>;

    /// List events with the given status, ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn list_events_by_status(&self, status: EventStatus) -> Result<Vec<Event>>;

    /// Atomically add to an event's sold counter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EventNotFound`] if the event does not exist.
    async fn add_tickets_sold(&self, id: &EventId, delta: u32) -> Result<()>;

    /// Atomically add to an event's comp counter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EventNotFound`] if the event does not exist.
    async fn add_comp_issued(&self, id: &EventId, delta: u32) -> Result<()>;

    /// Fetch a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Write a ticket record. Used only for record creation; transitions of
    /// an existing ticket must go through [`Self::transition_ticket`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn put_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Conditionally transition a ticket.
    ///
    /// Applies `change` only if the stored status equals `expected` at the
    /// moment of write, returning the updated record. This is the primitive
    /// that makes duplicated webhooks and concurrent scans resolve to
    /// exactly one effect.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::TicketNotFound`] if the ticket does not exist
    /// - [`crate::Error::PreconditionFailed`] if the status did not match;
    ///   the record is left untouched
    async fn transition_ticket(
        &self,
        id: &TicketId,
        expected: TicketStatus,
        change: TicketChange,
    ) -> Result<Ticket>;

    /// List a single event's tickets, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn list_tickets_by_event(&self, event_id: &EventId) -> Result<Vec<Ticket>>;

    /// List a purchaser's tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the store fails.
    async fn list_tickets_by_user(&self, user_id: &UserId) -> Result<Vec<Ticket>>;
}
