//! Ticket endpoints.
//!
//! - `POST /api/events/:event_id/checkout` - begin a purchase
//! - `POST /api/events/:event_id/comp-tickets` - issue a comp (admin)
//! - `GET  /api/events/:event_id/tickets` - list an event's tickets (admin)
//! - `GET  /api/tickets` - list the caller's tickets
//! - `GET  /api/tickets/:ticket_id` - fetch one ticket (owner or admin)

use crate::error::AppError;
use crate::extractors::{Caller, RequireAdmin};
use crate::handlers::DataBody;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::ORIGIN},
};
use gatehouse_core::checkout::CheckoutHandle;
use gatehouse_core::comp::CompRequest;
use gatehouse_core::types::{EventId, Ticket, TicketId};
use serde::Deserialize;

/// Request body for starting a checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Number of admissions, 1-10.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Begin a checkout: create the payment session and the PENDING ticket.
///
/// The storefront is redirected to the returned checkout URL; redirect
/// targets are built from the request's Origin header when present.
///
/// # Errors
///
/// Returns 400 for quantity/state/availability failures, 404 for an unknown
/// event, 500 when the payment provider fails.
pub async fn checkout(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(event_id): Path<EventId>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutHandle>, AppError> {
    let origin = headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(state.config.checkout.public_origin.as_str());

    let handle = state
        .checkout
        .begin(&event_id, request.quantity, &identity, origin)
        .await?;
    Ok(Json(handle))
}

/// Issue a complimentary ticket, created directly as VALID.
///
/// # Errors
///
/// Returns 400 for validation failures, 403 for non-admin callers, 404 for
/// an unknown event.
pub async fn issue_comp(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(event_id): Path<EventId>,
    Json(request): Json<CompRequest>,
) -> Result<(StatusCode, Json<DataBody<Ticket>>), AppError> {
    let ticket = state.comp.issue(&event_id, request, &admin).await?;
    Ok((StatusCode::CREATED, Json(DataBody::new(ticket))))
}

/// List the caller's tickets, newest first.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_my_tickets(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> Result<Json<DataBody<Vec<Ticket>>>, AppError> {
    let tickets = state.store.list_tickets_by_user(&identity.user_id).await?;
    Ok(Json(DataBody::new(tickets)))
}

/// Fetch a single ticket. Owners see their own tickets; admins see all.
///
/// # Errors
///
/// Returns 404 for an unknown ticket, 403 when the caller is neither the
/// owner nor an admin.
pub async fn get_ticket(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<DataBody<Ticket>>, AppError> {
    let ticket = state
        .store
        .get_ticket(&ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ticket not found"))?;

    if !identity.is_admin() && ticket.user_email != identity.email {
        return Err(AppError::forbidden("Access denied"));
    }

    Ok(Json(DataBody::new(ticket)))
}

/// List a single event's tickets, oldest first.
///
/// # Errors
///
/// Returns 403 for non-admin callers, 500 if the store fails.
pub async fn list_event_tickets(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(event_id): Path<EventId>,
) -> Result<Json<DataBody<Vec<Ticket>>>, AppError> {
    let tickets = state.store.list_tickets_by_event(&event_id).await?;
    Ok(Json(DataBody::new(tickets)))
}
