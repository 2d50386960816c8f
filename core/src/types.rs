//! Domain types for the ticketing core.
//!
//! Value objects, entities, and the caller identity contract. Entities are
//! plain owned data; every mutation goes through the ledger store, so no
//! type here carries interior mutability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Length of the random portion of a generated identifier.
const ID_RANDOM_LEN: usize = 16;

fn prefixed_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..ID_RANDOM_LEN])
}

/// Unique identifier for an event (`evt_` + 16 hex chars).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Generates a new random `EventId`.
    #[must_use]
    pub fn new() -> Self {
        Self(prefixed_id("evt"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket (`tkt_` + 16 hex chars).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Generates a new random `TicketId`.
    #[must_use]
    pub fn new() -> Self {
        Self(prefixed_id("tkt"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for TicketId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TicketId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a purchaser, issued by the external identity provider.
///
/// Comp tickets carry the sentinel purchaser [`UserId::comp`] because they
/// are not bound to a platform account.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// The sentinel purchaser recorded on complimentary tickets.
    #[must_use]
    pub fn comp() -> Self {
        Self("comp".to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in minor currency units (cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// The zero amount (free admission).
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies the amount by a quantity with overflow checking.
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Caller identity
// ============================================================================

/// Role granted by the external identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular purchaser.
    User,
    /// Platform administrator.
    Admin,
    /// Door staff allowed to scan tickets.
    Greeter,
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "GREETER" => Ok(Self::Greeter),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// Verified caller identity, attached to each request by the upstream
/// authorization layer.
///
/// The core never performs credential verification itself; it trusts this
/// pre-validated context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Identity-provider subject.
    pub user_id: UserId,
    /// Verified email address.
    pub email: String,
    /// Granted role.
    pub role: Role,
    /// Group memberships.
    pub groups: Vec<String>,
}

impl Identity {
    /// Whether this caller holds the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this caller may operate a check-in scanner.
    #[must_use]
    pub fn can_scan(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Greeter)
    }
}

// ============================================================================
// Event entity
// ============================================================================

/// Lifecycle status of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Being configured, not visible to the public.
    Draft,
    /// On sale.
    Active,
    /// Sold out (set by an administrator).
    SoldOut,
    /// Cancelled.
    Cancelled,
    /// Already happened.
    Past,
}

/// A ticketed occasion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Longer description shown on the storefront.
    pub description: String,
    /// Start of the schedule window.
    pub date: DateTime<Utc>,
    /// End of the schedule window.
    pub end_date: DateTime<Utc>,
    /// Venue or address.
    pub location: String,
    /// Unit price per ticket.
    pub price: Money,
    /// Maximum admissions; `None` means unbounded.
    pub capacity: Option<u32>,
    /// Paid admissions confirmed so far. Mutated only via atomic add.
    pub tickets_sold: u32,
    /// Complimentary admissions issued so far. Mutated only via atomic add.
    pub comp_tickets_issued: u32,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Optional promotional image.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// Administrator who created the event.
    pub created_by: UserId,
}

impl Event {
    /// Remaining availability, or `None` when capacity is unbounded.
    ///
    /// This is the advisory figure used by the checkout precondition; it is
    /// not transactionally protected against concurrent checkouts.
    #[must_use]
    pub const fn available(&self) -> Option<u32> {
        match self.capacity {
            Some(capacity) => Some(
                capacity.saturating_sub(self.tickets_sold.saturating_add(self.comp_tickets_issued)),
            ),
            None => None,
        }
    }
}

// ============================================================================
// Ticket entity
// ============================================================================

/// Lifecycle status of a ticket.
///
/// Status only moves forward along PENDING → VALID → USED, or sideways to
/// CANCELLED/REFUNDED from PENDING/VALID. USED, CANCELLED and REFUNDED are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Created at checkout, awaiting payment confirmation.
    Pending,
    /// Paid (or comped) and admissible.
    Valid,
    /// Admitted at the door.
    Used,
    /// Payment session expired or event cancelled.
    Cancelled,
    /// Payment refunded.
    Refunded,
}

/// One admission right (quantity ≥ 1) tied to exactly one event and one
/// purchaser or comp recipient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: TicketId,
    /// Event this ticket admits to.
    pub event_id: EventId,
    /// Purchaser account, or the comp sentinel.
    pub user_id: UserId,
    /// Purchaser email at time of purchase.
    pub user_email: String,
    /// Purchaser display name (may be empty for checkout purchases).
    pub user_name: String,
    /// When the purchase was initiated.
    pub purchase_date: DateTime<Utc>,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Whether this is a complimentary ticket.
    pub is_comp: bool,
    /// Administrator who issued the comp, if any.
    pub comp_issued_by: Option<UserId>,
    /// Reason recorded for the comp, if any.
    pub comp_reason: Option<String>,
    /// Payment-provider payment reference, set on confirmation.
    pub payment_intent_id: Option<String>,
    /// Payment-provider checkout session reference.
    pub checkout_session_id: Option<String>,
    /// Signed admission token, present once the ticket is VALID.
    pub admission_token: Option<String>,
    /// Admission timestamp; set if and only if status is USED.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Greeter or administrator who admitted the ticket.
    pub checked_in_by: Option<UserId>,
    /// Number of admissions this ticket grants.
    pub quantity: u32,
    /// Total amount paid.
    pub amount_paid: Money,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a PENDING ticket for a checkout purchase.
    #[must_use]
    pub fn pending(
        id: TicketId,
        event_id: EventId,
        identity: &Identity,
        checkout_session_id: String,
        quantity: u32,
        amount_paid: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            user_id: identity.user_id.clone(),
            user_email: identity.email.clone(),
            user_name: String::new(),
            purchase_date: now,
            status: TicketStatus::Pending,
            is_comp: false,
            comp_issued_by: None,
            comp_reason: None,
            payment_intent_id: None,
            checkout_session_id: Some(checkout_session_id),
            admission_token: None,
            checked_in_at: None,
            checked_in_by: None,
            quantity,
            amount_paid,
            created_at: now,
        }
    }

    /// Creates a ticket issued directly as VALID by an administrator.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn comp(
        id: TicketId,
        event_id: EventId,
        recipient_email: String,
        recipient_name: String,
        issued_by: UserId,
        reason: String,
        admission_token: String,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            user_id: UserId::comp(),
            user_email: recipient_email,
            user_name: recipient_name,
            purchase_date: now,
            status: TicketStatus::Valid,
            is_comp: true,
            comp_issued_by: Some(issued_by),
            comp_reason: Some(reason),
            payment_intent_id: None,
            checkout_session_id: None,
            admission_token: Some(admission_token),
            checked_in_at: None,
            checked_in_by: None,
            quantity,
            amount_paid: Money::ZERO,
            created_at: now,
        }
    }

    /// Display name used by the scanner UI: the recorded name, falling back
    /// to the purchase email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.user_name.is_empty() {
            &self.user_email
        } else {
            &self.user_name
        }
    }
}
