//! # Gatehouse Core
//!
//! The ticket lifecycle and check-in consistency core of an event-ticketing
//! platform. A ticket moves forward through a single state machine:
//!
//! ```text
//! PENDING ──payment confirmed──▶ VALID ──scanned at the door──▶ USED
//!    │                            │
//!    └──▶ CANCELLED / REFUNDED ◀──┘
//! ```
//!
//! Three services drive the transitions, all acting on the same [`Ticket`]
//! record owned by the [`store::LedgerStore`]:
//!
//! - [`checkout::CheckoutService`] creates the PENDING ticket and obtains a
//!   hosted payment session from the payment collaborator.
//! - [`confirmation::ConfirmationService`] consumes payment webhook events
//!   (at-least-once, possibly duplicated) and promotes PENDING → VALID
//!   exactly once, minting the signed admission token.
//! - [`admission::AdmissionService`] consumes a presented token and flips
//!   VALID → USED exactly once, rejecting replays with precise reason codes.
//!
//! # Concurrency model
//!
//! No service ever holds a lock across steps. Every racy mutation goes
//! through [`store::LedgerStore::transition_ticket`], a conditional write
//! that succeeds only if the record's current status matches the expected
//! prior status. Two concurrent scans of the same ticket therefore resolve
//! to exactly one successful admission; duplicated payment webhooks resolve
//! to exactly one promotion. Event counters move only via the store's
//! atomic add primitives, never read-modify-write.
//!
//! External collaborators (payment provider, email notifier) are consumed
//! through narrow traits in [`providers`]; development implementations live
//! in [`mocks`] and [`providers::console`].

#![forbid(unsafe_code)]

pub mod admission;
pub mod checkout;
pub mod clock;
pub mod comp;
pub mod confirmation;
pub mod error;
pub mod mocks;
pub mod providers;
pub mod store;
pub mod token;
pub mod types;
pub mod webhook;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use types::{Event, EventId, EventStatus, Identity, Money, Role, Ticket, TicketId, TicketStatus, UserId};
