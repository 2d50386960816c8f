//! Complimentary ticket issuance.
//!
//! An administrator can issue a ticket directly as VALID, bypassing payment.
//! Comp tickets share the same store and state-machine rules as purchased
//! tickets; only their entry path differs.

use crate::checkout::MAX_QUANTITY;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::providers::email::{NotificationKind, Notifier, TicketNotification};
use crate::store::LedgerStore;
use crate::token::AdmissionTokens;
use crate::types::{EventId, EventStatus, Identity, Ticket, TicketId, UserId};
use std::sync::Arc;

/// Request to issue a complimentary ticket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompRequest {
    /// Recipient email address.
    pub user_email: String,
    /// Recipient display name.
    pub user_name: String,
    /// Number of admissions, 1–10.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Reason recorded for the issuance.
    pub reason: String,
}

const fn default_quantity() -> u32 {
    1
}

/// Issues complimentary tickets.
#[derive(Clone)]
pub struct CompService {
    store: Arc<dyn LedgerStore>,
    tokens: Arc<AdmissionTokens>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl CompService {
    /// Creates a comp issuance service.
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

    /// Issues a ticket directly as VALID with a minted admission token.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when the request fields fail validation or
    ///   the event's status does not allow comps
    /// - [`Error::InvalidQuantity`] when `quantity` is outside 1–10
    /// - [`Error::EventNotFound`] when the event does not exist
    pub async fn issue(
        &self,
        event_id: &EventId,
        request: CompRequest,
        issuer: &Identity,
    ) -> Result<Ticket> {
        if request.quantity == 0 || request.quantity > MAX_QUANTITY {
            return Err(Error::InvalidQuantity { max: MAX_QUANTITY });
        }
        if !request.user_email.contains('@') {
            return Err(Error::Validation("recipient email is invalid".to_string()));
        }
        if request.user_name.trim().is_empty() {
            return Err(Error::Validation("recipient name is required".to_string()));
        }
        if request.reason.trim().is_empty() {
            return Err(Error::Validation("a reason is required".to_string()));
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::EventNotFound(event_id.clone()))?;

        if matches!(event.status, EventStatus::Cancelled | EventStatus::Past) {
            return Err(Error::Validation(
                "cannot issue comp tickets for this event".to_string(),
            ));
        }

        let ticket_id = TicketId::new();
        let now = self.clock.now();
        let token = self
            .tokens
            .issue(&ticket_id, event_id, &UserId::comp(), now)?;

        let ticket = Ticket::comp(
            ticket_id,
            event_id.clone(),
            request.user_email.clone(),
            request.user_name.clone(),
            issuer.user_id.clone(),
            request.reason,
            token.clone(),
            request.quantity,
            now,
        );
        self.store.put_ticket(&ticket).await?;
        self.store
            .add_comp_issued(event_id, request.quantity)
            .await?;

        tracing::info!(
            ticket_id = %ticket.id,
            event_id = %event_id,
            issued_by = %issuer.user_id,
            quantity = request.quantity,
            "comp ticket issued"
        );

        let notification = TicketNotification {
            kind: NotificationKind::CompTicket,
            ticket_id: ticket.id.clone(),
            event_id: event_id.clone(),
            recipient: request.user_email,
            token,
            user_name: Some(request.user_name),
            event_name: event.name,
            event_date: event.date,
            event_location: event.location,
        };
        if let Err(error) = self.notifier.notify(notification).await {
            tracing::warn!(ticket_id = %ticket.id, %error, "comp notification failed");
        }

        Ok(ticket)
    }
}
