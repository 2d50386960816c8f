//! Checkout orchestrator.
//!
//! Reserves a PENDING ticket, obtains a hosted payment session from the
//! payment collaborator, and hands back the redirect target. Event counters
//! do not move here; they move only on confirmed payment.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::providers::payment::{CheckoutProvider, LineItem, SessionMetadata, SessionRequest};
use crate::store::LedgerStore;
use crate::types::{EventId, EventStatus, Identity, Ticket, TicketId};
use std::sync::Arc;

/// Maximum tickets per purchase.
pub const MAX_QUANTITY: u32 = 10;

/// Redirect target returned to the storefront.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutHandle {
    /// Hosted payment page to redirect the purchaser to.
    pub checkout_url: String,
    /// Provider-side session identifier.
    pub session_id: String,
    /// The PENDING ticket created for this purchase.
    pub ticket_id: TicketId,
}

/// Orchestrates the purchase path up to the payment redirect.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn LedgerStore>,
    payments: Arc<dyn CheckoutProvider>,
    clock: Arc<dyn Clock>,
}

impl CheckoutService {
    /// Creates a checkout service.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        payments: Arc<dyn CheckoutProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            payments,
            clock,
        }
    }

    /// Begins a checkout: validates the event, opens a payment session and
    /// writes the PENDING ticket.
    ///
    /// The availability check is advisory, not transactional: two
    /// simultaneous checkouts for the last seat can both pass it and both
    /// create PENDING tickets. Closing that window would take a reservation
    /// counter with a conditional increment here; the ticket layer does not
    /// currently prevent the oversell.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQuantity`] when `quantity` is outside 1–10
    /// - [`Error::EventNotFound`] when the event does not exist
    /// - [`Error::EventNotOnSale`] when the event is not ACTIVE
    /// - [`Error::InsufficientAvailability`] when fewer seats remain than
    ///   requested
    /// - [`Error::PaymentProvider`] when the session cannot be created
    pub async fn begin(
        &self,
        event_id: &EventId,
        quantity: u32,
        identity: &Identity,
        origin: &str,
    ) -> Result<CheckoutHandle> {
        if quantity == 0 || quantity > MAX_QUANTITY {
            return Err(Error::InvalidQuantity { max: MAX_QUANTITY });
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::EventNotFound(event_id.clone()))?;

        if event.status != EventStatus::Active {
            return Err(Error::EventNotOnSale {
                status: event.status,
            });
        }

        if let Some(available) = event.available() {
            if available < quantity {
                return Err(Error::InsufficientAvailability { available });
            }
        }

        let amount = event
            .price
            .checked_multiply(quantity)
            .ok_or_else(|| Error::Validation("purchase amount overflows".to_string()))?;

        let ticket_id = TicketId::new();
        let now = self.clock.now();

        let session = self
            .payments
            .create_session(SessionRequest {
                line_item: LineItem {
                    name: event.name.clone(),
                    description: format!(
                        "Ticket for {} on {}",
                        event.name,
                        event.date.format("%Y-%m-%d")
                    ),
                    unit_amount: event.price,
                    quantity,
                },
                metadata: SessionMetadata {
                    event_id: event_id.clone(),
                    ticket_id: ticket_id.clone(),
                    user_id: identity.user_id.clone(),
                },
                success_url: format!(
                    "{origin}/events/{event_id}/confirmation?ticketId={ticket_id}"
                ),
                cancel_url: format!("{origin}/events/{event_id}"),
                customer_email: identity.email.clone(),
            })
            .await?;

        let ticket = Ticket::pending(
            ticket_id.clone(),
            event_id.clone(),
            identity,
            session.id.clone(),
            quantity,
            amount,
            now,
        );
        self.store.put_ticket(&ticket).await?;

        tracing::info!(
            ticket_id = %ticket_id,
            event_id = %event_id,
            user_id = %identity.user_id,
            quantity,
            amount = amount.cents(),
            "checkout started"
        );

        Ok(CheckoutHandle {
            checkout_url: session.url,
            session_id: session.id,
            ticket_id,
        })
    }
}
