//! Payment collaborator trait.

use crate::error::Result;
use crate::types::{EventId, Money, TicketId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Single purchasable line item for a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Product name shown on the payment page.
    pub name: String,
    /// Product description shown on the payment page.
    pub description: String,
    /// Unit price.
    pub unit_amount: Money,
    /// Quantity purchased.
    pub quantity: u32,
}

/// Metadata attached to a checkout session at creation and echoed back in
/// every webhook notification about that session.
///
/// This is the only channel by which the confirmation handler learns which
/// ticket a payment belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Event being purchased.
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    /// Pending ticket awaiting this payment.
    #[serde(rename = "ticketId")]
    pub ticket_id: TicketId,
    /// Purchaser account.
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// What is being bought.
    pub line_item: LineItem,
    /// Ticket-binding metadata echoed back by webhooks.
    pub metadata: SessionMetadata,
    /// Where the payment page redirects after success.
    pub success_url: String,
    /// Where the payment page redirects after cancellation.
    pub cancel_url: String,
    /// Pre-filled purchaser email.
    pub customer_email: String,
}

/// Handle to a created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider-side session identifier.
    pub id: String,
    /// Hosted payment page the purchaser is redirected to.
    pub url: String,
}

/// Payment collaborator.
///
/// Abstraction over hosted-checkout payment processors. The provider later
/// delivers signed webhook notifications for session completion, expiry and
/// refunds; those are handled by [`crate::confirmation`], not this trait.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Open a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PaymentProvider`] if the provider rejects the
    /// request or is unreachable.
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession>;
}
