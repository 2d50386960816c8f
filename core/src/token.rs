//! Admission token issuer/verifier.
//!
//! The admission token is the signed, time-bounded credential embedded in a
//! ticket's QR code. It is an HS256 JWT whose payload carries the ticket id
//! as subject, the event id and purchaser id as claims, and a fixed issuer
//! tag. Issuance and verification are pure functions keyed by a
//! process-wide secret loaded once and never mutated.
//!
//! Verification never escapes as an untyped error: every failure is mapped
//! to a [`TokenError`] so the admission validator can report a user-facing
//! reason code instead of a server error.

use crate::error::{Error, Result};
use crate::types::{EventId, TicketId, UserId};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error as ThisError;

type HmacSha256 = Hmac<Sha256>;

/// Default token validity window.
const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// JOSE header for every token this issuer mints.
const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Typed verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum TokenError {
    /// The token's validity window has passed.
    #[error("admission token has expired")]
    Expired,
    /// The token is structurally invalid, carries an unexpected issuer or
    /// algorithm, or its signature does not verify.
    #[error("admission token is malformed")]
    Malformed,
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionClaims {
    /// Ticket the token admits.
    pub ticket_id: TicketId,
    /// Event the ticket belongs to.
    pub event_id: EventId,
    /// Purchaser, or the comp sentinel.
    pub purchaser_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    eid: String,
    uid: String,
    iss: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct WireHeader {
    alg: String,
}

/// Signs and verifies admission tokens.
#[derive(Clone)]
pub struct AdmissionTokens {
    secret: Vec<u8>,
    issuer: String,
    validity: Duration,
}

impl std::fmt::Debug for AdmissionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The signing secret must never appear in logs.
        f.debug_struct("AdmissionTokens")
            .field("issuer", &self.issuer)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl AdmissionTokens {
    /// Creates an issuer/verifier keyed by `secret` and tagged with
    /// `issuer`, with the default 365-day validity window.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            validity: Duration::days(DEFAULT_VALIDITY_DAYS),
        }
    }

    /// Overrides the validity window.
    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Mints a signed token binding `ticket_id` and `event_id` to
    /// `purchaser`, valid from `now` for the configured window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenIssuance`] if the claims cannot be serialized
    /// or the key is rejected by the MAC.
    pub fn issue(
        &self,
        ticket_id: &TicketId,
        event_id: &EventId,
        purchaser: &UserId,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let claims = WireClaims {
            sub: ticket_id.to_string(),
            eid: event_id.to_string(),
            uid: purchaser.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        let payload =
            serde_json::to_vec(&claims).map_err(|e| Error::TokenIssuance(e.to_string()))?;

        let header = URL_SAFE_NO_PAD.encode(HEADER.as_bytes());
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verifies a presented token and recovers its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] for structural, issuer, algorithm or
    ///   signature failures (including tokens signed with a different
    ///   secret)
    /// - [`TokenError::Expired`] once the validity window has passed
    pub fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<AdmissionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let wire_header: WireHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if wire_header.alg != "HS256" {
            return Err(TokenError::Malformed);
        }

        let signing_input = format!("{header}.{payload}");
        let expected = self
            .sign(signing_input.as_bytes())
            .map_err(|_| TokenError::Malformed)?;
        let presented = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        if !constant_time_eq(&expected, &presented) {
            return Err(TokenError::Malformed);
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: WireClaims =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

        if claims.iss != self.issuer {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(AdmissionClaims {
            ticket_id: TicketId::from(claims.sub),
            event_id: EventId::from(claims.eid),
            purchaser_id: UserId::from(claims.uid),
        })
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| Error::TokenIssuance("signing key rejected".to_string()))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
