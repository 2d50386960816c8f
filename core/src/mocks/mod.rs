//! Mock collaborator implementations for development and testing.

pub mod email;
pub mod payment;

pub use email::RecordingNotifier;
pub use payment::MockCheckoutProvider;
