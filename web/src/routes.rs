//! Router configuration for the Gatehouse server.

use crate::handlers::{admission, events, health, tickets, webhooks};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// Storefront, admin and scanner endpoints live under `/api`; the payment
/// webhook receiver is unauthenticated and protected by its payload
/// signature instead.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Event management
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        // Purchase and comp paths
        .route("/events/:event_id/checkout", post(tickets::checkout))
        .route("/events/:event_id/comp-tickets", post(tickets::issue_comp))
        .route("/events/:event_id/tickets", get(tickets::list_event_tickets))
        // Ticket queries
        .route("/tickets", get(tickets::list_my_tickets))
        .route("/tickets/:ticket_id", get(tickets::get_ticket))
        // Check-in scanner
        .route("/tickets/validate", post(admission::validate_ticket))
        // Payment webhook (signature-authenticated)
        .route("/webhooks/payment", post(webhooks::payment_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
