//! Handler-level integration tests.
//!
//! Drives the full purchase-to-admission flow through the HTTP handlers
//! (create → activate → checkout → signed webhook → scan) against the
//! in-memory ledger.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use gatehouse_core::admission::AdmissionService;
use gatehouse_core::checkout::CheckoutService;
use gatehouse_core::clock::Clock;
use gatehouse_core::comp::{CompRequest, CompService};
use gatehouse_core::confirmation::ConfirmationService;
use gatehouse_core::mocks::{MockCheckoutProvider, RecordingNotifier};
use gatehouse_core::store::{LedgerStore, MemoryLedger};
use gatehouse_core::token::AdmissionTokens;
use gatehouse_core::types::{EventStatus, TicketStatus};
use gatehouse_core::webhook::WebhookVerifier;
use gatehouse_core::{EventId, TicketId, UserId};
use gatehouse_testing::FixedClock;
use gatehouse_testing::fixtures::{admin, buyer, greeter};
use gatehouse_web::config::Config;
use gatehouse_web::extractors::{Caller, RequireAdmin, RequireScanner};
use gatehouse_web::handlers::webhooks::SIGNATURE_HEADER;
use gatehouse_web::handlers::{admission, events, tickets, webhooks};
use gatehouse_web::state::AppState;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

const TOKEN_SECRET: &[u8] = b"handler-token-secret";
const WEBHOOK_SECRET: &[u8] = b"handler-webhook-secret";

fn app_state() -> AppState {
    let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedger::new());
    let clock = Arc::new(FixedClock::default());
    let tokens = Arc::new(AdmissionTokens::new(TOKEN_SECRET.to_vec(), "gatehouse"));
    let notifier = Arc::new(RecordingNotifier::new());

    AppState::new(
        Arc::clone(&store),
        CheckoutService::new(
            Arc::clone(&store),
            Arc::new(MockCheckoutProvider::new()),
            clock.clone(),
        ),
        ConfirmationService::new(
            Arc::clone(&store),
            Arc::clone(&tokens),
            notifier.clone(),
            clock.clone(),
        ),
        AdmissionService::new(Arc::clone(&store), Arc::clone(&tokens), clock.clone()),
        CompService::new(Arc::clone(&store), tokens, notifier, clock.clone()),
        WebhookVerifier::new(WEBHOOK_SECRET.to_vec()),
        clock,
        Arc::new(Config::from_env()),
    )
}

fn sign(payload: &[u8], timestamp: i64) -> HeaderMap {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let digest = hex::encode(mac.finalize().into_bytes());

    let mut headers = HeaderMap::new();
    headers.insert(
        SIGNATURE_HEADER,
        HeaderValue::from_str(&format!("t={timestamp},v1={digest}")).unwrap(),
    );
    headers
}

async fn create_active_event(state: &AppState) -> EventId {
    let (status, Json(body)) = events::create_event(
        State(state.clone()),
        RequireAdmin(admin()),
        Json(serde_json::from_value(serde_json::json!({
            "name": "Spring Gala",
            "description": "Annual fundraiser",
            "date": "2025-06-01T18:00:00Z",
            "endDate": "2025-06-01T21:00:00Z",
            "location": "Main Hall",
            "price": 2500,
            "capacity": 100,
        }))
        .unwrap()),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.data.status, EventStatus::Draft);

    let event_id = body.data.id;
    events::update_event(
        State(state.clone()),
        RequireAdmin(admin()),
        Path(event_id.clone()),
        Json(serde_json::from_value(serde_json::json!({ "status": "ACTIVE" })).unwrap()),
    )
    .await
    .unwrap();

    event_id
}

fn completed_payload(event_id: &EventId, ticket_id: &TicketId, user_id: &UserId) -> Vec<u8> {
    serde_json::json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_handler",
                "metadata": {
                    "eventId": event_id.as_str(),
                    "ticketId": ticket_id.as_str(),
                    "userId": user_id.as_str(),
                },
                "payment_intent": "pi_handler",
                "customer_email": "buyer@example.com",
            }
        }
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn full_purchase_and_admission_flow() {
    let state = app_state();
    let event_id = create_active_event(&state).await;

    // Storefront starts a checkout.
    let Json(handle) = tickets::checkout(
        State(state.clone()),
        Caller(buyer()),
        Path(event_id.clone()),
        HeaderMap::new(),
        Json(serde_json::from_value(serde_json::json!({ "quantity": 2 })).unwrap()),
    )
    .await
    .unwrap();
    assert!(handle.checkout_url.contains(&handle.session_id));

    // Payment provider confirms via signed webhook.
    let payload = completed_payload(&event_id, &handle.ticket_id, &buyer().user_id);
    let headers = sign(&payload, state.clock.now().timestamp());
    let Json(ack) = webhooks::payment_webhook(State(state.clone()), headers, payload.clone().into())
        .await
        .unwrap();
    assert_eq!(ack["received"], true);

    let ticket = state
        .store
        .get_ticket(&handle.ticket_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Valid);
    let token = ticket.admission_token.unwrap();

    // Duplicate delivery is acknowledged without a second promotion.
    let headers = sign(&payload, state.clock.now().timestamp());
    webhooks::payment_webhook(State(state.clone()), headers, payload.into())
        .await
        .unwrap();
    let event = state.store.get_event(&event_id).await.unwrap().unwrap();
    assert_eq!(event.tickets_sold, 2);

    // Greeter scans the QR token.
    let Json(outcome) = admission::validate_ticket(
        State(state.clone()),
        RequireScanner(greeter()),
        Json(serde_json::from_value(serde_json::json!({ "qrToken": token })).unwrap()),
    )
    .await
    .unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.event_name.as_deref(), Some("Spring Gala"));

    // A replayed scan is rejected with the exact wire contract.
    let Json(replay) = admission::validate_ticket(
        State(state.clone()),
        RequireScanner(greeter()),
        Json(serde_json::from_value(serde_json::json!({ "qrToken": token })).unwrap()),
    )
    .await
    .unwrap();
    let wire = serde_json::to_value(&replay).unwrap();
    assert_eq!(wire["valid"], false);
    assert_eq!(wire["reason"], "ALREADY_CHECKED_IN");
    assert!(wire["ticketId"].is_string());
    assert!(wire.get("eventName").is_none());
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected_without_state_change() {
    let state = app_state();
    let event_id = create_active_event(&state).await;

    let Json(handle) = tickets::checkout(
        State(state.clone()),
        Caller(buyer()),
        Path(event_id.clone()),
        HeaderMap::new(),
        Json(serde_json::from_value(serde_json::json!({})).unwrap()),
    )
    .await
    .unwrap();

    let payload = completed_payload(&event_id, &handle.ticket_id, &buyer().user_id);

    // Missing signature header.
    let err = webhooks::payment_webhook(State(state.clone()), HeaderMap::new(), payload.clone().into())
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Forged signature.
    let mut headers = HeaderMap::new();
    headers.insert(
        SIGNATURE_HEADER,
        HeaderValue::from_static("t=0,v1=deadbeef"),
    );
    let err = webhooks::payment_webhook(State(state.clone()), headers, payload.into())
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // No state change happened.
    let ticket = state
        .store
        .get_ticket(&handle.ticket_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Pending);
}

#[tokio::test]
async fn comp_issuance_creates_valid_scannable_ticket() {
    let state = app_state();
    let event_id = create_active_event(&state).await;

    let (status, Json(body)) = tickets::issue_comp(
        State(state.clone()),
        RequireAdmin(admin()),
        Path(event_id.clone()),
        Json(CompRequest {
            user_email: "guest@example.com".to_string(),
            user_name: "Guest Speaker".to_string(),
            quantity: 1,
            reason: "speaker".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.data.is_comp);

    let token = body.data.admission_token.clone().unwrap();
    let Json(outcome) = admission::validate_ticket(
        State(state.clone()),
        RequireScanner(greeter()),
        Json(serde_json::from_value(serde_json::json!({ "qrToken": token })).unwrap()),
    )
    .await
    .unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.user_name.as_deref(), Some("Guest Speaker"));

    let event = state.store.get_event(&event_id).await.unwrap().unwrap();
    assert_eq!(event.comp_tickets_issued, 1);
}

#[tokio::test]
async fn ticket_access_is_owner_or_admin_only() {
    let state = app_state();
    let event_id = create_active_event(&state).await;

    let Json(handle) = tickets::checkout(
        State(state.clone()),
        Caller(buyer()),
        Path(event_id),
        HeaderMap::new(),
        Json(serde_json::from_value(serde_json::json!({})).unwrap()),
    )
    .await
    .unwrap();

    // The owner and an admin can read the ticket.
    assert!(
        tickets::get_ticket(
            State(state.clone()),
            Caller(buyer()),
            Path(handle.ticket_id.clone())
        )
        .await
        .is_ok()
    );
    assert!(
        tickets::get_ticket(
            State(state.clone()),
            Caller(admin()),
            Path(handle.ticket_id.clone())
        )
        .await
        .is_ok()
    );

    // A different user cannot.
    let err = tickets::get_ticket(
        State(state.clone()),
        Caller(greeter()),
        Path(handle.ticket_id),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}
