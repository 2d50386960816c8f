//! Mock payment provider for development and testing.
//!
//! Simulates a hosted-checkout processor: every session is created
//! successfully with a deterministic-looking handle. In production this is
//! replaced by a real processor integration behind the same trait.

use crate::error::{Error, Result};
use crate::providers::payment::{CheckoutProvider, CheckoutSession, SessionRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Mock payment provider (always succeeds unless configured otherwise).
#[derive(Debug, Clone, Default)]
pub struct MockCheckoutProvider {
    requests: Arc<Mutex<Vec<SessionRequest>>>,
    should_succeed: bool,
}

impl MockCheckoutProvider {
    /// Creates a mock provider that accepts every session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            should_succeed: true,
        }
    }

    /// Creates a mock provider that rejects every session.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            should_succeed: false,
        }
    }

    /// Creates an Arc-wrapped instance for sharing.
    #[must_use]
    pub fn shared() -> Arc<dyn CheckoutProvider> {
        Arc::new(Self::new())
    }

    /// Returns the session requests recorded so far.
    #[must_use]
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests.lock().map_or_else(|_| Vec::new(), |r| r.clone())
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession> {
        if !self.should_succeed {
            return Err(Error::PaymentProvider("mock provider rejected session".to_string()));
        }

        let id = format!("cs_mock_{}", Uuid::new_v4().simple());
        let session = CheckoutSession {
            url: format!("https://checkout.invalid/pay/{id}"),
            id,
        };

        tracing::info!(
            session_id = %session.id,
            ticket_id = %request.metadata.ticket_id,
            amount = request.line_item.unit_amount.cents(),
            quantity = request.line_item.quantity,
            "mock checkout session created"
        );

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::providers::payment::{LineItem, SessionMetadata};
    use crate::types::{EventId, Money, TicketId, UserId};

    fn request() -> SessionRequest {
        SessionRequest {
            line_item: LineItem {
                name: "Spring Gala".to_string(),
                description: "Ticket for Spring Gala".to_string(),
                unit_amount: Money::from_cents(2_500),
                quantity: 2,
            },
            metadata: SessionMetadata {
                event_id: EventId::from("evt_1"),
                ticket_id: TicketId::from("tkt_1"),
                user_id: UserId::from("usr_1"),
            },
            success_url: "https://store.invalid/confirmation".to_string(),
            cancel_url: "https://store.invalid/event".to_string(),
            customer_email: "pat@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_session_and_records_request() {
        let provider = MockCheckoutProvider::new();
        let session = provider.create_session(request()).await.unwrap();

        assert!(session.id.starts_with("cs_mock_"));
        assert!(session.url.contains(&session.id));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn failing_provider_rejects() {
        let provider = MockCheckoutProvider::failing();
        let err = provider.create_session(request()).await.unwrap_err();
        assert!(matches!(err, Error::PaymentProvider(_)));
    }
}
