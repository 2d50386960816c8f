//! Error types for web handlers.
//!
//! Bridges core errors onto HTTP responses. Every response body follows the
//! platform's error contract: `{"error": {"code", "message"}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_core::Error as CoreError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors and implements Axum's `IntoResponse`, so handlers can
/// return `Result<Json<T>, AppError>` and use `?` on core calls.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code.
    status: StatusCode,
    /// User-facing message.
    message: String,
    /// Machine-readable code for client error handling.
    code: &'static str,
    /// Internal error (for logging, not exposed to the client).
    #[allow(dead_code)]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_ERROR",
        )
    }

    /// The HTTP status this error renders as.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable code this error renders with.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Maps the core taxonomy onto HTTP statuses.
///
/// State conflicts are mapped by the services before they reach a handler;
/// a `PreconditionFailed` arriving here is a programming error surfaced as
/// 409 rather than masked.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => Self::bad_request(message),
            client @ (CoreError::InvalidQuantity { .. }
            | CoreError::EventNotOnSale { .. }
            | CoreError::InsufficientAvailability { .. }
            | CoreError::MalformedPayload(_)) => Self::bad_request(client.to_string()),
            CoreError::InvalidSignature => Self::bad_request("Invalid signature"),
            CoreError::EventNotFound(_) => Self::not_found("Event not found"),
            CoreError::TicketNotFound(_) => Self::not_found("Ticket not found"),
            conflict @ CoreError::PreconditionFailed => Self::conflict(conflict.to_string()),
            server @ (CoreError::PaymentProvider(_)
            | CoreError::Notification(_)
            | CoreError::TokenIssuance(_)
            | CoreError::Storage(_)) => {
                Self::internal("An internal error occurred").with_source(server.into())
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = %source,
                    "internal server error"
                );
            } else {
                tracing::error!(status = %self.status, code = self.code, "internal server error");
            }
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gatehouse_core::types::{EventId, EventStatus, TicketId};

    #[test]
    fn display_includes_code_and_message() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn client_errors_map_to_400() {
        for err in [
            CoreError::InvalidQuantity { max: 10 },
            CoreError::EventNotOnSale {
                status: EventStatus::Draft,
            },
            CoreError::InsufficientAvailability { available: 2 },
            CoreError::InvalidSignature,
            CoreError::MalformedPayload("bad".to_string()),
        ] {
            assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn lookups_map_to_404() {
        let err = AppError::from(CoreError::EventNotFound(EventId::from("evt_x")));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = AppError::from(CoreError::TicketNotFound(TicketId::from("tkt_x")));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_errors_map_to_500_without_leaking_detail() {
        let err = AppError::from(CoreError::Storage("connection refused".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "[INTERNAL_ERROR] An internal error occurred");
    }
}
