//! External collaborator contracts.
//!
//! The core consumes the payment processor and the email notifier through
//! these narrow traits. Development implementations live in
//! [`crate::mocks`] and [`console`].

pub mod console;
pub mod email;
pub mod payment;

pub use console::ConsoleNotifier;
pub use email::{NotificationKind, Notifier, TicketNotification};
pub use payment::{CheckoutProvider, CheckoutSession, LineItem, SessionMetadata, SessionRequest};
