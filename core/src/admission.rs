//! Admission validator.
//!
//! The check-in state machine. Decodes a presented admission token, looks up
//! the ticket, and atomically transitions it VALID → USED. Every branch
//! terminates in a definitive outcome with a precise reason code; the
//! scanning client is never left in an ambiguous state.
//!
//! Two simultaneous scans of the same ticket (a photographed QR code shown
//! at two entrances, or a flaky network retrying a scan) resolve to exactly
//! one successful admission: the ledger's conditional update is the
//! arbiter, and the loser reports `ALREADY_CHECKED_IN`.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::store::{LedgerStore, TicketChange};
use crate::token::AdmissionTokens;
use crate::types::{Identity, TicketId, TicketStatus};
use serde::Serialize;
use std::sync::Arc;

/// Why a presented ticket was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The token failed to decode (expired, tampered, or signed with a
    /// rotated secret).
    Expired,
    /// No ticket exists for the token's subject.
    NotFound,
    /// The ticket exists but is not admissible (pending, cancelled,
    /// refunded).
    Invalid,
    /// The ticket was already used, possibly by a concurrent scan.
    AlreadyCheckedIn,
}

/// Definitive outcome reported to the scanner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Whether the holder may enter.
    pub valid: bool,
    /// Rejection reason, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// Ticket identifier, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
    /// Holder display name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Event name, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
}

impl ValidationOutcome {
    fn admitted(ticket_id: TicketId, user_name: String, event_name: String) -> Self {
        Self {
            valid: true,
            reason: None,
            ticket_id: Some(ticket_id),
            user_name: Some(user_name),
            event_name: Some(event_name),
        }
    }

    fn rejected(reason: RejectionReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            ticket_id: None,
            user_name: None,
            event_name: None,
        }
    }

    fn rejected_for_ticket(
        reason: RejectionReason,
        ticket_id: TicketId,
        user_name: Option<String>,
    ) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            ticket_id: Some(ticket_id),
            user_name,
            event_name: None,
        }
    }
}

/// Validates presented tokens and admits ticket holders.
#[derive(Clone)]
pub struct AdmissionService {
    store: Arc<dyn LedgerStore>,
    tokens: Arc<AdmissionTokens>,
    clock: Arc<dyn Clock>,
}

impl AdmissionService {
    /// Creates an admission service.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        tokens: Arc<AdmissionTokens>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tokens,
            clock,
        }
    }

    /// Runs the check-in state machine for one presented token.
    ///
    /// Token decode failures and state conflicts are reported as rejection
    /// outcomes, never as errors; only store failures propagate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the ledger fails.
    pub async fn check_in(&self, token: &str, caller: &Identity) -> Result<ValidationOutcome> {
        let now = self.clock.now();

        let Ok(claims) = self.tokens.verify(token, now) else {
            return Ok(ValidationOutcome::rejected(RejectionReason::Expired));
        };

        let Some(ticket) = self.store.get_ticket(&claims.ticket_id).await? else {
            return Ok(ValidationOutcome::rejected(RejectionReason::NotFound));
        };

        if ticket.status == TicketStatus::Used {
            return Ok(ValidationOutcome::rejected_for_ticket(
                RejectionReason::AlreadyCheckedIn,
                ticket.id.clone(),
                Some(ticket.display_name().to_string()),
            ));
        }

        if ticket.status != TicketStatus::Valid {
            return Ok(ValidationOutcome::rejected_for_ticket(
                RejectionReason::Invalid,
                ticket.id,
                None,
            ));
        }

        let admitted = match self
            .store
            .transition_ticket(
                &ticket.id,
                TicketStatus::Valid,
                TicketChange::admit(now, caller.user_id.clone()),
            )
            .await
        {
            Ok(updated) => updated,
            Err(Error::PreconditionFailed) => {
                // Lost the race to a concurrent scan of the same ticket.
                return Ok(ValidationOutcome::rejected_for_ticket(
                    RejectionReason::AlreadyCheckedIn,
                    ticket.id,
                    None,
                ));
            }
            Err(Error::TicketNotFound(_)) => {
                return Ok(ValidationOutcome::rejected(RejectionReason::NotFound));
            }
            Err(other) => return Err(other),
        };

        let event_name = self
            .store
            .get_event(&admitted.event_id)
            .await?
            .map(|event| event.name)
            .unwrap_or_default();

        tracing::info!(
            ticket_id = %admitted.id,
            checked_in_by = %caller.user_id,
            "ticket admitted"
        );

        Ok(ValidationOutcome::admitted(
            admitted.id.clone(),
            admitted.display_name().to_string(),
            event_name,
        ))
    }
}
