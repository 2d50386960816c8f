//! Check-in endpoint for greeter scanners.

use crate::error::AppError;
use crate::extractors::RequireScanner;
use crate::state::AppState;
use axum::{Json, extract::State};
use gatehouse_core::admission::ValidationOutcome;
use serde::Deserialize;

/// Request body carrying the scanned QR token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    /// The token decoded from the QR code.
    pub qr_token: String,
}

/// Validate a scanned ticket and admit the holder.
///
/// Always answers 200 with a definitive `{valid, ...}` body; the scanning
/// client is never left in an ambiguous state. Rejections carry one of the
/// reasons EXPIRED, `NOT_FOUND`, INVALID or `ALREADY_CHECKED_IN`.
///
/// # Errors
///
/// Returns 400 for an empty token, 403 for callers without scan rights, 500
/// if the store fails.
pub async fn validate_ticket(
    State(state): State<AppState>,
    RequireScanner(scanner): RequireScanner,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidationOutcome>, AppError> {
    if request.qr_token.is_empty() {
        return Err(AppError::bad_request("QR token is required"));
    }

    let outcome = state.admission.check_in(&request.qr_token, &scanner).await?;
    Ok(Json(outcome))
}
