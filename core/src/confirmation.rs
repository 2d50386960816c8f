//! Payment confirmation handler.
//!
//! Consumes payment-provider webhook notifications. Delivery is
//! at-least-once and possibly duplicated, so promotion is guarded by the
//! ledger's conditional update: however many times a completion notification
//! arrives, the ticket moves PENDING → VALID exactly once, the sold counter
//! moves exactly once, and the admission token is issued exactly once.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::providers::email::{NotificationKind, Notifier, TicketNotification};
use crate::store::{LedgerStore, TicketChange};
use crate::token::AdmissionTokens;
use crate::types::{Ticket, TicketStatus};
use crate::webhook::{SessionEnvelope, WebhookEvent};
use std::sync::Arc;

/// Outcome of processing one webhook notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// The ticket was promoted to VALID by this notification.
    Promoted {
        /// The updated ticket record.
        ticket: Ticket,
    },
    /// The ticket had already left PENDING; the notification was a
    /// duplicate and had no effect.
    Duplicate,
    /// The payment session lapsed and the ticket was (or already had been)
    /// cancelled.
    SessionCancelled,
    /// The notification was acknowledged without a state change.
    Acknowledged,
}

/// Promotes tickets on confirmed payment.
#[derive(Clone)]
pub struct ConfirmationService {
    store: Arc<dyn LedgerStore>,
    tokens: Arc<AdmissionTokens>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ConfirmationService {
    /// Creates a confirmation service.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        tokens: Arc<AdmissionTokens>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tokens,
            notifier,
            clock,
        }
    }

    /// Processes one already-signature-verified webhook notification.
    ///
    /// State-conflict races never surface as errors: a duplicate completion
    /// resolves to [`Confirmation::Duplicate`]. Anything else that fails
    /// (store, token issuance) is returned so the provider retries; the
    /// conditional update is what makes those retries safe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] when a consumed notification
    /// lacks its session metadata, or the underlying store/token error.
    pub async fn process(&self, event: WebhookEvent) -> Result<Confirmation> {
        match event {
            WebhookEvent::SessionCompleted { data } => self.complete(data).await,
            WebhookEvent::SessionExpired { data } => self.expire(data).await,
            WebhookEvent::ChargeRefunded { data } => {
                // Reconciliation against the ticket record by payment
                // reference is a known gap; acknowledged only.
                tracing::info!(
                    payment_intent = data.object.payment_intent.as_deref().unwrap_or("unknown"),
                    "refund notification received"
                );
                Ok(Confirmation::Acknowledged)
            }
            WebhookEvent::Unrecognized => {
                tracing::debug!("ignoring unrecognized webhook event type");
                Ok(Confirmation::Acknowledged)
            }
        }
    }

    async fn complete(&self, data: SessionEnvelope) -> Result<Confirmation> {
        let metadata = data
            .object
            .metadata
            .ok_or_else(|| Error::MalformedPayload("completed session without metadata".to_string()))?;
        let payment_intent = data.object.payment_intent.unwrap_or_default();

        let token = self.tokens.issue(
            &metadata.ticket_id,
            &metadata.event_id,
            &metadata.user_id,
            self.clock.now(),
        )?;

        let ticket = match self
            .store
            .transition_ticket(
                &metadata.ticket_id,
                TicketStatus::Pending,
                TicketChange::promote(payment_intent, token.clone()),
            )
            .await
        {
            Ok(ticket) => ticket,
            Err(Error::PreconditionFailed) => {
                tracing::info!(
                    ticket_id = %metadata.ticket_id,
                    "ticket already processed, skipping duplicate webhook"
                );
                return Ok(Confirmation::Duplicate);
            }
            Err(Error::TicketNotFound(id)) => {
                // The provider can redeliver completions long after a
                // record was reconciled away; acknowledging stops the
                // retry loop.
                tracing::warn!(ticket_id = %id, "completion for unknown ticket ignored");
                return Ok(Confirmation::Duplicate);
            }
            Err(other) => return Err(other),
        };

        self.store
            .add_tickets_sold(&metadata.event_id, ticket.quantity)
            .await?;

        tracing::info!(
            ticket_id = %ticket.id,
            event_id = %metadata.event_id,
            quantity = ticket.quantity,
            "ticket promoted to VALID"
        );

        let recipient = data
            .object
            .customer_email
            .unwrap_or_else(|| ticket.user_email.clone());
        self.send_confirmation(&ticket, recipient, token).await;

        Ok(Confirmation::Promoted { ticket })
    }

    async fn expire(&self, data: SessionEnvelope) -> Result<Confirmation> {
        let metadata = data
            .object
            .metadata
            .ok_or_else(|| Error::MalformedPayload("expired session without metadata".to_string()))?;

        match self
            .store
            .transition_ticket(&metadata.ticket_id, TicketStatus::Pending, TicketChange::cancel())
            .await
        {
            Ok(_) => {
                tracing::info!(ticket_id = %metadata.ticket_id, "pending ticket cancelled after session expiry");
            }
            Err(Error::PreconditionFailed | Error::TicketNotFound(_)) => {
                // Best effort: the ticket already moved on (e.g. a late
                // expiry racing a completion must not regress a VALID
                // ticket).
                tracing::debug!(ticket_id = %metadata.ticket_id, "expiry ignored, ticket already transitioned");
            }
            Err(other) => return Err(other),
        }

        Ok(Confirmation::SessionCancelled)
    }

    /// Delivery failure is logged and swallowed; it never rolls back the
    /// promotion that triggered it.
    async fn send_confirmation(&self, ticket: &Ticket, recipient: String, token: String) {
        let event = match self.store.get_event(&ticket.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::warn!(event_id = %ticket.event_id, "event missing, skipping confirmation email");
                return;
            }
            Err(error) => {
                tracing::warn!(%error, "event lookup failed, skipping confirmation email");
                return;
            }
        };

        let notification = TicketNotification {
            kind: NotificationKind::TicketConfirmation,
            ticket_id: ticket.id.clone(),
            event_id: ticket.event_id.clone(),
            recipient,
            token,
            user_name: (!ticket.user_name.is_empty()).then(|| ticket.user_name.clone()),
            event_name: event.name,
            event_date: event.date,
            event_location: event.location,
        };

        if let Err(error) = self.notifier.notify(notification).await {
            tracing::warn!(ticket_id = %ticket.id, %error, "confirmation notification failed");
        }
    }
}
