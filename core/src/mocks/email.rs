//! Recording notifier for testing.

use crate::error::{Error, Result};
use crate::providers::email::{Notifier, TicketNotification};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Notifier that captures every delivery instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<TicketNotification>>>,
    should_succeed: bool,
}

impl RecordingNotifier {
    /// Creates a recording notifier that accepts every delivery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_succeed: true,
        }
    }

    /// Creates a recording notifier that fails every delivery.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_succeed: false,
        }
    }

    /// Returns the notifications captured so far.
    #[must_use]
    pub fn sent(&self) -> Vec<TicketNotification> {
        self.sent.lock().map_or_else(|_| Vec::new(), |s| s.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: TicketNotification) -> Result<()> {
        if !self.should_succeed {
            return Err(Error::Notification("mock delivery failure".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
        Ok(())
    }
}
