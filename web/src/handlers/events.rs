//! Event management endpoints.
//!
//! - `POST   /api/events` - create (admin)
//! - `GET    /api/events` - list by status
//! - `GET    /api/events/:event_id` - fetch
//! - `PUT    /api/events/:event_id` - partial update (admin)
//! - `DELETE /api/events/:event_id` - soft-cancel (admin)

use crate::error::AppError;
use crate::extractors::RequireAdmin;
use crate::handlers::DataBody;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use gatehouse_core::Clock;
use gatehouse_core::types::{Event, EventId, EventStatus, Money};
use serde::Deserialize;
use serde_json::{Value, json};

const MAX_LIST_LIMIT: usize = 100;
const DEFAULT_LIST_LIMIT: usize = 50;

/// Request to create a new event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Schedule window start.
    pub date: DateTime<Utc>,
    /// Schedule window end.
    pub end_date: DateTime<Utc>,
    /// Venue or address.
    pub location: String,
    /// Unit price in cents.
    pub price: u64,
    /// Capacity; `null` means unbounded.
    pub capacity: Option<u32>,
    /// Optional promotional image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() || self.name.len() > 200 {
            return Err(AppError::bad_request("Name must be 1-200 characters"));
        }
        if self.description.is_empty() || self.description.len() > 5000 {
            return Err(AppError::bad_request("Description must be 1-5000 characters"));
        }
        if self.location.is_empty() || self.location.len() > 500 {
            return Err(AppError::bad_request("Location must be 1-500 characters"));
        }
        if self.capacity == Some(0) {
            return Err(AppError::bad_request("Capacity must be positive"));
        }
        Ok(())
    }
}

/// Create a new event in DRAFT with zeroed counters.
///
/// # Errors
///
/// Returns 400 on validation failure, 403 for non-admin callers.
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<DataBody<Event>>), AppError> {
    request.validate()?;

    let now = state.clock.now();
    let event = Event {
        id: EventId::new(),
        name: request.name,
        description: request.description,
        date: request.date,
        end_date: request.end_date,
        location: request.location,
        price: Money::from_cents(request.price),
        capacity: request.capacity,
        tickets_sold: 0,
        comp_tickets_issued: 0,
        status: EventStatus::Draft,
        image_url: request.image_url,
        created_at: now,
        updated_at: now,
        created_by: admin.user_id,
    };
    state.store.put_event(&event).await?;

    tracing::info!(event_id = %event.id, "event created");
    Ok((StatusCode::CREATED, Json(DataBody::new(event))))
}

/// Query parameters for listing events.
#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    /// Status to filter by; defaults to ACTIVE.
    pub status: Option<EventStatus>,
    /// Maximum number of events to return (capped at 100).
    pub limit: Option<usize>,
}

/// List events with the given status, ordered by start date.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<DataBody<Vec<Event>>>, AppError> {
    let status = query.status.unwrap_or(EventStatus::Active);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);

    let mut events = state.store.list_events_by_status(status).await?;
    events.truncate(limit);
    Ok(Json(DataBody::new(events)))
}

/// Fetch a single event.
///
/// # Errors
///
/// Returns 404 if the event does not exist.
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<DataBody<Event>>, AppError> {
    let event = state
        .store
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    Ok(Json(DataBody::new(event)))
}

/// Request to update an event. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    /// Updated name.
    pub name: Option<String>,
    /// Updated description.
    pub description: Option<String>,
    /// Updated schedule window start.
    pub date: Option<DateTime<Utc>>,
    /// Updated schedule window end.
    pub end_date: Option<DateTime<Utc>>,
    /// Updated venue.
    pub location: Option<String>,
    /// Updated unit price in cents.
    pub price: Option<u64>,
    /// Updated capacity. `Some(None)` clears the bound.
    #[serde(default, with = "double_option")]
    pub capacity: Option<Option<u32>>,
    /// Updated lifecycle status.
    pub status: Option<EventStatus>,
    /// Updated image URL.
    pub image_url: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Apply a partial update to an event.
///
/// # Errors
///
/// Returns 404 if the event does not exist, 403 for non-admin callers.
pub async fn update_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(event_id): Path<EventId>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<DataBody<Event>>, AppError> {
    let mut event = state
        .store
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    if let Some(name) = request.name {
        event.name = name;
    }
    if let Some(description) = request.description {
        event.description = description;
    }
    if let Some(date) = request.date {
        event.date = date;
    }
    if let Some(end_date) = request.end_date {
        event.end_date = end_date;
    }
    if let Some(location) = request.location {
        event.location = location;
    }
    if let Some(price) = request.price {
        event.price = Money::from_cents(price);
    }
    if let Some(capacity) = request.capacity {
        event.capacity = capacity;
    }
    if let Some(status) = request.status {
        event.status = status;
    }
    if let Some(image_url) = request.image_url {
        event.image_url = Some(image_url);
    }
    event.updated_at = state.clock.now();

    state.store.put_event(&event).await?;
    Ok(Json(DataBody::new(event)))
}

/// Soft-delete an event by cancelling it.
///
/// # Errors
///
/// Returns 404 if the event does not exist, 403 for non-admin callers.
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(event_id): Path<EventId>,
) -> Result<Json<DataBody<Value>>, AppError> {
    let mut event = state
        .store
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    event.status = EventStatus::Cancelled;
    event.updated_at = state.clock.now();
    state.store.put_event(&event).await?;

    tracing::info!(event_id = %event_id, "event cancelled");
    Ok(Json(DataBody::new(json!({ "message": "Event cancelled" }))))
}
