//! Payment webhook verification and payload types.
//!
//! The payment collaborator delivers asynchronous, at-least-once, possibly
//! duplicated notifications signed with a shared secret. The signature
//! header carries a unix timestamp and one or more HMAC-SHA256 digests over
//! `"{timestamp}.{body}"`; verification rejects stale timestamps to bound
//! replay, and compares digests in constant time. Nothing in a payload is
//! trusted before the signature verifies.

use crate::error::{Error, Result};
use crate::providers::payment::SessionMetadata;
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance for the signature timestamp.
const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifies webhook payload signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Creates a verifier keyed by the shared webhook secret, with the
    /// default 5-minute timestamp tolerance.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS),
        }
    }

    /// Overrides the timestamp tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Verifies `signature_header` (format `t=<unix>,v1=<hex>[,v1=<hex>…]`)
    /// against `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the header cannot be parsed,
    /// the timestamp is outside the tolerance window, or no digest matches.
    pub fn verify(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut timestamp: Option<i64> = None;
        let mut digests: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse().ok(),
                Some(("v1", value)) => digests.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(Error::InvalidSignature)?;
        if digests.is_empty() {
            return Err(Error::InvalidSignature);
        }
        if (now.timestamp() - timestamp).abs() > self.tolerance.num_seconds() {
            return Err(Error::InvalidSignature);
        }

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| Error::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        if digests
            .iter()
            .any(|candidate| constant_time_eq(expected.as_bytes(), candidate.as_bytes()))
        {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

// ============================================================================
// Payload types
// ============================================================================

/// A verified webhook notification.
///
/// Unrecognized event types deserialize to [`WebhookEvent::Unrecognized`]
/// and are acknowledged without effect, so the provider does not retry them
/// forever.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEvent {
    /// The purchaser completed payment.
    #[serde(rename = "checkout.session.completed")]
    SessionCompleted {
        /// Notification payload.
        data: SessionEnvelope,
    },
    /// The checkout session lapsed without payment.
    #[serde(rename = "checkout.session.expired")]
    SessionExpired {
        /// Notification payload.
        data: SessionEnvelope,
    },
    /// A charge was refunded.
    #[serde(rename = "charge.refunded")]
    ChargeRefunded {
        /// Notification payload.
        data: ChargeEnvelope,
    },
    /// Any event type this handler does not consume.
    #[serde(other)]
    Unrecognized,
}

impl WebhookEvent {
    /// Parses a raw (already signature-verified) payload body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] if the body is not valid JSON of
    /// the expected shape.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| Error::MalformedPayload(e.to_string()))
    }
}

/// `data` envelope of a checkout-session notification.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionEnvelope {
    /// The session object.
    pub object: CheckoutSessionPayload,
}

/// Checkout-session fields consumed by the confirmation handler.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionPayload {
    /// Provider-side session identifier.
    pub id: Option<String>,
    /// Ticket-binding metadata attached at session creation.
    pub metadata: Option<SessionMetadata>,
    /// Payment reference, present once payment completed.
    pub payment_intent: Option<String>,
    /// Purchaser email recorded by the payment page.
    pub customer_email: Option<String>,
}

/// `data` envelope of a charge notification.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeEnvelope {
    /// The charge object.
    pub object: ChargePayload,
}

/// Charge fields consumed by the refund acknowledgement path.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargePayload {
    /// Payment reference the refund applies to.
    pub payment_intent: Option<String>,
}
