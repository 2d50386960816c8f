//! Request handlers, grouped by surface.

pub mod admission;
pub mod events;
pub mod health;
pub mod tickets;
pub mod webhooks;

use serde::Serialize;

/// Standard success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    /// The wrapped payload.
    pub data: T,
}

impl<T> DataBody<T> {
    /// Wraps a payload in the success envelope.
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}
