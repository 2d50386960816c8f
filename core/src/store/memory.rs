//! In-memory ledger engine.
//!
//! A single-lock table set giving linearizable conditional writes and strong
//! read-after-write consistency on every lookup, including the secondary
//! indexes. This is the development and test engine; a hosted document store
//! with a compare-and-swap conditional write plugs in behind the same trait.

use crate::error::{Error, Result};
use crate::store::{LedgerStore, TicketChange};
use crate::types::{Event, EventId, EventStatus, Ticket, TicketId, TicketStatus, UserId};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    tickets: HashMap<TicketId, Ticket>,
    tickets_by_event: HashMap<EventId, BTreeSet<TicketId>>,
    tickets_by_user: HashMap<UserId, BTreeSet<TicketId>>,
}

/// In-memory [`LedgerStore`] implementation.
///
/// All access is serialized behind one mutex, so every conditional update is
/// atomic and every index read observes all committed writes.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<Tables>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        self.inner
            .lock()
            .map_err(|_| Error::Storage("ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>> {
        Ok(self.lock()?.events.get(id).cloned())
    }

    async fn put_event(&self, event: &Event) -> Result<()> {
        self.lock()?.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn list_events_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .lock()?
            .events
            .values()
            .filter(|event| event.status == status)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.date);
        Ok(events)
    }

    async fn add_tickets_sold(&self, id: &EventId, delta: u32) -> Result<()> {
        let mut tables = self.lock()?;
        let event = tables
            .events
            .get_mut(id)
            .ok_or_else(|| Error::EventNotFound(id.clone()))?;
        event.tickets_sold = event.tickets_sold.saturating_add(delta);
        Ok(())
    }

    async fn add_comp_issued(&self, id: &EventId, delta: u32) -> Result<()> {
        let mut tables = self.lock()?;
        let event = tables
            .events
            .get_mut(id)
            .ok_or_else(|| Error::EventNotFound(id.clone()))?;
        event.comp_tickets_issued = event.comp_tickets_issued.saturating_add(delta);
        Ok(())
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        Ok(self.lock()?.tickets.get(id).cloned())
    }

    async fn put_ticket(&self, ticket: &Ticket) -> Result<()> {
        let mut tables = self.lock()?;
        tables
            .tickets_by_event
            .entry(ticket.event_id.clone())
            .or_default()
            .insert(ticket.id.clone());
        tables
            .tickets_by_user
            .entry(ticket.user_id.clone())
            .or_default()
            .insert(ticket.id.clone());
        tables.tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    async fn transition_ticket(
        &self,
        id: &TicketId,
        expected: TicketStatus,
        change: TicketChange,
    ) -> Result<Ticket> {
        let mut tables = self.lock()?;
        let ticket = tables
            .tickets
            .get_mut(id)
            .ok_or_else(|| Error::TicketNotFound(id.clone()))?;

        if ticket.status != expected {
            return Err(Error::PreconditionFailed);
        }

        ticket.status = change.status;
        if let Some(payment_intent_id) = change.payment_intent_id {
            ticket.payment_intent_id = Some(payment_intent_id);
        }
        if let Some(admission_token) = change.admission_token {
            ticket.admission_token = Some(admission_token);
        }
        if let Some(checked_in_at) = change.checked_in_at {
            ticket.checked_in_at = Some(checked_in_at);
        }
        if let Some(checked_in_by) = change.checked_in_by {
            ticket.checked_in_by = Some(checked_in_by);
        }

        Ok(ticket.clone())
    }

    async fn list_tickets_by_event(&self, event_id: &EventId) -> Result<Vec<Ticket>> {
        let tables = self.lock()?;
        let mut tickets: Vec<Ticket> = tables
            .tickets_by_event
            .get(event_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.tickets.get(id).cloned())
            .collect();
        tickets.sort_by_key(|ticket| ticket.created_at);
        Ok(tickets)
    }

    async fn list_tickets_by_user(&self, user_id: &UserId) -> Result<Vec<Ticket>> {
        let tables = self.lock()?;
        let mut tickets: Vec<Ticket> = tables
            .tickets_by_user
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.tickets.get(id).cloned())
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Identity, Money, Role};
    use chrono::{Duration, Utc};

    fn identity() -> Identity {
        Identity {
            user_id: UserId::from("usr_a"),
            email: "a@example.com".to_string(),
            role: Role::User,
            groups: vec![],
        }
    }

    fn event(status: EventStatus) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            name: "Spring Gala".to_string(),
            description: "Annual fundraiser".to_string(),
            date: now + Duration::days(30),
            end_date: now + Duration::days(30) + Duration::hours(3),
            location: "Main Hall".to_string(),
            price: Money::from_cents(2_500),
            capacity: Some(100),
            tickets_sold: 0,
            comp_tickets_issued: 0,
            status,
            image_url: None,
            created_at: now,
            updated_at: now,
            created_by: UserId::from("usr_admin"),
        }
    }

    fn pending_ticket(event_id: &EventId) -> Ticket {
        Ticket::pending(
            TicketId::new(),
            event_id.clone(),
            &identity(),
            "cs_1".to_string(),
            1,
            Money::from_cents(2_500),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn conditional_transition_applies_change_once() {
        let store = MemoryLedger::new();
        let event = event(EventStatus::Active);
        let ticket = pending_ticket(&event.id);
        store.put_ticket(&ticket).await.unwrap();

        let updated = store
            .transition_ticket(
                &ticket.id,
                TicketStatus::Pending,
                TicketChange::promote("pi_1".to_string(), "token".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TicketStatus::Valid);
        assert_eq!(updated.payment_intent_id.as_deref(), Some("pi_1"));

        // Second identical transition loses the precondition.
        let err = store
            .transition_ticket(
                &ticket.id,
                TicketStatus::Pending,
                TicketChange::promote("pi_2".to_string(), "other".to_string()),
            )
            .await
            .unwrap_err();
        assert_eq!(err, Error::PreconditionFailed);

        // And the record was left untouched by the losing caller.
        let stored = store.get_ticket(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_intent_id.as_deref(), Some("pi_1"));
    }

    #[tokio::test]
    async fn transition_of_missing_ticket_reports_not_found() {
        let store = MemoryLedger::new();
        let err = store
            .transition_ticket(
                &TicketId::from("tkt_missing"),
                TicketStatus::Valid,
                TicketChange::cancel(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TicketNotFound(_)));
    }

    #[tokio::test]
    async fn counters_add_atomically() {
        let store = MemoryLedger::new();
        let event = event(EventStatus::Active);
        store.put_event(&event).await.unwrap();

        store.add_tickets_sold(&event.id, 2).await.unwrap();
        store.add_tickets_sold(&event.id, 3).await.unwrap();
        store.add_comp_issued(&event.id, 1).await.unwrap();

        let stored = store.get_event(&event.id).await.unwrap().unwrap();
        assert_eq!(stored.tickets_sold, 5);
        assert_eq!(stored.comp_tickets_issued, 1);
        assert_eq!(stored.available(), Some(94));
    }

    #[tokio::test]
    async fn indexes_reflect_committed_writes() {
        let store = MemoryLedger::new();
        let event = event(EventStatus::Active);
        store.put_event(&event).await.unwrap();

        let first = pending_ticket(&event.id);
        let second = pending_ticket(&event.id);
        store.put_ticket(&first).await.unwrap();
        store.put_ticket(&second).await.unwrap();

        let by_event = store.list_tickets_by_event(&event.id).await.unwrap();
        assert_eq!(by_event.len(), 2);

        let by_user = store
            .list_tickets_by_user(&UserId::from("usr_a"))
            .await
            .unwrap();
        assert_eq!(by_user.len(), 2);

        let active = store
            .list_events_by_status(EventStatus::Active)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert!(store
            .list_events_by_status(EventStatus::Draft)
            .await
            .unwrap()
            .is_empty());
    }
}
