//! Time abstraction for testability.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations so services can be tested with a
/// deterministic clock.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock backed by the host's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for in-crate unit tests.
///
/// Mirrors `gatehouse_testing::FixedClock` but lives inside `core` so that the
/// crate's own `#[cfg(test)]` modules don't pass a `Clock` trait object across
/// the `gatehouse-testing` dev-dependency boundary (which would otherwise link
/// two distinct copies of `gatehouse-core`).
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock {
    time: DateTime<Utc>,
}

#[cfg(test)]
impl Default for FixedClock {
    fn default() -> Self {
        Self {
            time: DateTime::from_timestamp(1_735_689_600, 0).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}
