//! Payment webhook receiver.
//!
//! The payment collaborator retries deliveries on any non-2xx response, so
//! the status codes here are part of the contract: 400 for anything that
//! will never verify (bad signature, unparseable payload), 500 for
//! transient failures so the provider retries, and 200 for success or a
//! recognized duplicate.

use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use gatehouse_core::Clock;
use gatehouse_core::webhook::WebhookEvent;
use serde_json::{Value, json};

/// Header carrying the payment provider's payload signature.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Receive one payment webhook notification.
///
/// The payload signature is verified before any field is trusted.
///
/// # Errors
///
/// Returns 400 for a missing/invalid signature or malformed payload, 500
/// when the store fails (the provider retries; the conditional update makes
/// the retry safe).
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request("Missing signature"))?;

    state.webhooks.verify(&body, signature, state.clock.now())?;

    let event = WebhookEvent::from_payload(&body)?;
    let outcome = state.confirmation.process(event).await?;

    tracing::debug!(?outcome, "webhook processed");
    Ok(Json(json!({ "received": true })))
}
