//! Payment flow integration tests.
//!
//! Exercises the checkout → webhook → confirmation path end to end against
//! the in-memory ledger, including duplicate-delivery idempotency and the
//! free-event and oversell scenarios.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use gatehouse_core::checkout::CheckoutService;
use gatehouse_core::confirmation::{Confirmation, ConfirmationService};
use gatehouse_core::mocks::{MockCheckoutProvider, RecordingNotifier};
use gatehouse_core::providers::email::NotificationKind;
use gatehouse_core::store::{LedgerStore, MemoryLedger};
use gatehouse_core::token::AdmissionTokens;
use gatehouse_core::types::{Money, TicketStatus};
use gatehouse_core::webhook::WebhookEvent;
use gatehouse_core::{Error, EventId, TicketId, UserId};
use gatehouse_testing::fixtures::{active_event, buyer};
use gatehouse_testing::FixedClock;
use std::sync::Arc;

struct Harness {
    store: Arc<MemoryLedger>,
    notifier: Arc<RecordingNotifier>,
    checkout: CheckoutService,
    confirmation: ConfirmationService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryLedger::new());
    let payments = Arc::new(MockCheckoutProvider::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let tokens = Arc::new(AdmissionTokens::new(b"flow-secret".to_vec(), "gatehouse"));
    let clock = Arc::new(FixedClock::default());

    let checkout = CheckoutService::new(
        Arc::clone(&store) as Arc<dyn LedgerStore>,
        Arc::clone(&payments) as _,
        Arc::clone(&clock) as _,
    );
    let confirmation = ConfirmationService::new(
        Arc::clone(&store) as Arc<dyn LedgerStore>,
        tokens,
        Arc::clone(&notifier) as _,
        clock,
    );

    Harness {
        store,
        notifier,
        checkout,
        confirmation,
    }
}

fn completed_webhook(event_id: &EventId, ticket_id: &TicketId, user_id: &UserId) -> WebhookEvent {
    let payload = serde_json::json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test",
                "metadata": {
                    "eventId": event_id.as_str(),
                    "ticketId": ticket_id.as_str(),
                    "userId": user_id.as_str(),
                },
                "payment_intent": "pi_test_123",
                "customer_email": "buyer@example.com",
            }
        }
    });
    WebhookEvent::from_payload(payload.to_string().as_bytes()).unwrap()
}

fn expired_webhook(event_id: &EventId, ticket_id: &TicketId, user_id: &UserId) -> WebhookEvent {
    let payload = serde_json::json!({
        "type": "checkout.session.expired",
        "data": {
            "object": {
                "id": "cs_test",
                "metadata": {
                    "eventId": event_id.as_str(),
                    "ticketId": ticket_id.as_str(),
                    "userId": user_id.as_str(),
                },
            }
        }
    });
    WebhookEvent::from_payload(payload.to_string().as_bytes()).unwrap()
}

#[tokio::test]
async fn completed_payment_promotes_ticket_exactly_once() {
    let h = harness();
    let event = active_event(Some(100), Money::from_cents(2_500));
    h.store.put_event(&event).await.unwrap();

    let handle = h
        .checkout
        .begin(&event.id, 3, &buyer(), "https://store.example.com")
        .await
        .unwrap();

    let webhook = completed_webhook(&event.id, &handle.ticket_id, &buyer().user_id);
    let outcome = h.confirmation.process(webhook.clone()).await.unwrap();
    assert!(matches!(outcome, Confirmation::Promoted { .. }));

    let ticket = h.store.get_ticket(&handle.ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Valid);
    assert_eq!(ticket.payment_intent_id.as_deref(), Some("pi_test_123"));
    assert!(ticket.admission_token.is_some());

    // Sold counter moved by the ticket quantity, once.
    let stored = h.store.get_event(&event.id).await.unwrap().unwrap();
    assert_eq!(stored.tickets_sold, 3);

    // One confirmation notification, carrying the minted token.
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::TicketConfirmation);
    assert_eq!(sent[0].token, ticket.admission_token.unwrap());
    assert_eq!(sent[0].recipient, "buyer@example.com");

    // At-least-once delivery: replays are acknowledged without effect.
    for _ in 0..3 {
        let outcome = h.confirmation.process(webhook.clone()).await.unwrap();
        assert_eq!(outcome, Confirmation::Duplicate);
    }
    let stored = h.store.get_event(&event.id).await.unwrap().unwrap();
    assert_eq!(stored.tickets_sold, 3);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn free_event_with_unlimited_capacity_confirms_at_zero() {
    let h = harness();
    let event = active_event(None, Money::ZERO);
    h.store.put_event(&event).await.unwrap();

    let handle = h
        .checkout
        .begin(&event.id, 1, &buyer(), "https://store.example.com")
        .await
        .unwrap();

    let pending = h.store.get_ticket(&handle.ticket_id).await.unwrap().unwrap();
    assert_eq!(pending.status, TicketStatus::Pending);
    assert_eq!(pending.amount_paid, Money::ZERO);

    let outcome = h
        .confirmation
        .process(completed_webhook(&event.id, &handle.ticket_id, &buyer().user_id))
        .await
        .unwrap();
    assert!(matches!(outcome, Confirmation::Promoted { .. }));

    let ticket = h.store.get_ticket(&handle.ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Valid);
    assert!(ticket.amount_paid.is_zero());
}

#[tokio::test]
async fn last_seat_race_is_advisory_and_both_checkouts_pass() {
    let h = harness();
    let event = active_event(Some(1), Money::from_cents(1_000));
    h.store.put_event(&event).await.unwrap();

    // Both requests read availability before either payment confirms, so
    // both pass the advisory check and both create PENDING tickets. The
    // ticket layer does not currently prevent the oversell.
    let first = h
        .checkout
        .begin(&event.id, 1, &buyer(), "https://x")
        .await
        .unwrap();
    let second = h
        .checkout
        .begin(&event.id, 1, &buyer(), "https://x")
        .await
        .unwrap();
    assert_ne!(first.ticket_id, second.ticket_id);

    let tickets = h.store.list_tickets_by_event(&event.id).await.unwrap();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.status == TicketStatus::Pending));
}

#[tokio::test]
async fn expired_session_cancels_pending_ticket_best_effort() {
    let h = harness();
    let event = active_event(Some(10), Money::from_cents(1_000));
    h.store.put_event(&event).await.unwrap();

    let handle = h
        .checkout
        .begin(&event.id, 1, &buyer(), "https://x")
        .await
        .unwrap();

    let outcome = h
        .confirmation
        .process(expired_webhook(&event.id, &handle.ticket_id, &buyer().user_id))
        .await
        .unwrap();
    assert_eq!(outcome, Confirmation::SessionCancelled);

    let ticket = h.store.get_ticket(&handle.ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Cancelled);

    // A late expiry after completion must not regress the ticket.
    let other = h
        .checkout
        .begin(&event.id, 1, &buyer(), "https://x")
        .await
        .unwrap();
    h.confirmation
        .process(completed_webhook(&event.id, &other.ticket_id, &buyer().user_id))
        .await
        .unwrap();
    let outcome = h
        .confirmation
        .process(expired_webhook(&event.id, &other.ticket_id, &buyer().user_id))
        .await
        .unwrap();
    assert_eq!(outcome, Confirmation::SessionCancelled);
    let ticket = h.store.get_ticket(&other.ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Valid);
}

#[tokio::test]
async fn refund_and_unknown_events_are_acknowledged_without_effect() {
    let h = harness();

    let refund = WebhookEvent::from_payload(
        br#"{"type":"charge.refunded","data":{"object":{"payment_intent":"pi_9"}}}"#,
    )
    .unwrap();
    assert_eq!(
        h.confirmation.process(refund).await.unwrap(),
        Confirmation::Acknowledged
    );

    let unknown =
        WebhookEvent::from_payload(br#"{"type":"payout.paid","data":{"object":{}}}"#).unwrap();
    assert_eq!(
        h.confirmation.process(unknown).await.unwrap(),
        Confirmation::Acknowledged
    );
}

#[tokio::test]
async fn completion_without_metadata_is_malformed() {
    let h = harness();
    let webhook = WebhookEvent::from_payload(
        br#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#,
    )
    .unwrap();

    let err = h.confirmation.process(webhook).await.unwrap_err();
    assert!(matches!(err, Error::MalformedPayload(_)));
}

#[tokio::test]
async fn notification_failure_does_not_unwind_promotion() {
    let store = Arc::new(MemoryLedger::new());
    let notifier = Arc::new(RecordingNotifier::failing());
    let tokens = Arc::new(AdmissionTokens::new(b"flow-secret".to_vec(), "gatehouse"));
    let clock = Arc::new(FixedClock::default());
    let payments = Arc::new(MockCheckoutProvider::new());

    let checkout = CheckoutService::new(
        Arc::clone(&store) as Arc<dyn LedgerStore>,
        payments,
        Arc::clone(&clock) as _,
    );
    let confirmation = ConfirmationService::new(
        Arc::clone(&store) as Arc<dyn LedgerStore>,
        tokens,
        notifier,
        clock,
    );

    let event = active_event(Some(10), Money::from_cents(500));
    store.put_event(&event).await.unwrap();
    let handle = checkout
        .begin(&event.id, 1, &buyer(), "https://x")
        .await
        .unwrap();

    let outcome = confirmation
        .process(completed_webhook(&event.id, &handle.ticket_id, &buyer().user_id))
        .await
        .unwrap();
    assert!(matches!(outcome, Confirmation::Promoted { .. }));

    let ticket = store.get_ticket(&handle.ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Valid);
}
