//! Error taxonomy for the ticketing core.

use crate::types::{EventId, EventStatus, TicketId};
use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes of the ticketing core, organized by category.
///
/// State-conflict errors ([`Error::PreconditionFailed`]) are never surfaced
/// to the original causal request: the services map them to idempotent
/// outcomes (duplicate webhook ignored, already checked in). Everything else
/// maps to a client or server error at the web boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════
    // Client input errors
    // ═══════════════════════════════════════════════════════════

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Requested quantity outside the allowed range.
    #[error("quantity must be between 1 and {max}")]
    InvalidQuantity {
        /// Maximum allowed quantity per purchase.
        max: u32,
    },

    // ═══════════════════════════════════════════════════════════
    // Lookup and state errors
    // ═══════════════════════════════════════════════════════════

    /// Event does not exist.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// Ticket does not exist.
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// Event is not in a state that allows the operation.
    #[error("event is not available for purchase")]
    EventNotOnSale {
        /// The event's current status.
        status: EventStatus,
    },

    /// Fewer tickets remain than requested.
    #[error("only {available} tickets available")]
    InsufficientAvailability {
        /// Remaining availability at check time.
        available: u32,
    },

    // ═══════════════════════════════════════════════════════════
    // State-conflict errors
    // ═══════════════════════════════════════════════════════════

    /// A conditional update found the record in a different state than
    /// expected. The caller lost a race; never a hard failure.
    #[error("record state did not match the expected prior state")]
    PreconditionFailed,

    // ═══════════════════════════════════════════════════════════
    // Collaborator and infrastructure errors
    // ═══════════════════════════════════════════════════════════

    /// Webhook payload signature did not verify.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Webhook payload could not be interpreted.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    /// Payment collaborator failed.
    #[error("payment provider error: {0}")]
    PaymentProvider(String),

    /// Notification collaborator failed. Never rolls back ticket state.
    #[error("notification error: {0}")]
    Notification(String),

    /// Token could not be minted.
    #[error("token issuance error: {0}")]
    TokenIssuance(String),

    /// Underlying store failed.
    #[error("storage error: {0}")]
    Storage(String),
}
