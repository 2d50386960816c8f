//! # Gatehouse Testing
//!
//! Testing utilities for the Gatehouse workspace: a deterministic clock and
//! builders for common domain fixtures, so service tests read as scenarios
//! rather than setup.

#![forbid(unsafe_code)]

use chrono::{DateTime, Duration, Utc};
use gatehouse_core::clock::Clock;

/// Mock implementations of core traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests.
    ///
    /// Always returns the same time, making expiry and check-in timestamps
    /// reproducible.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Creates a fixed clock pinned to `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Returns the pinned time.
        #[must_use]
        pub const fn time(&self) -> DateTime<Utc> {
            self.time
        }
    }

    impl Default for FixedClock {
        /// A clock pinned to 2025-01-01 00:00:00 UTC.
        fn default() -> Self {
            Self::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or(DateTime::UNIX_EPOCH))
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }
}

/// Builders for common domain fixtures.
pub mod fixtures {
    use super::{Duration, Utc};
    use gatehouse_core::types::{Event, EventId, EventStatus, Identity, Money, Role, UserId};

    /// An ACTIVE event two weeks out with the given capacity and price.
    #[must_use]
    pub fn active_event(capacity: Option<u32>, price: Money) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            name: "Spring Gala".to_string(),
            description: "Annual spring fundraiser".to_string(),
            date: now + Duration::days(14),
            end_date: now + Duration::days(14) + Duration::hours(3),
            location: "Main Hall".to_string(),
            price,
            capacity,
            tickets_sold: 0,
            comp_tickets_issued: 0,
            status: EventStatus::Active,
            image_url: None,
            created_at: now,
            updated_at: now,
            created_by: UserId::from("usr_admin"),
        }
    }

    /// A regular purchaser identity.
    #[must_use]
    pub fn buyer() -> Identity {
        Identity {
            user_id: UserId::from("usr_buyer"),
            email: "buyer@example.com".to_string(),
            role: Role::User,
            groups: vec![],
        }
    }

    /// An administrator identity.
    #[must_use]
    pub fn admin() -> Identity {
        Identity {
            user_id: UserId::from("usr_admin"),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            groups: vec!["admins".to_string()],
        }
    }

    /// A door-staff identity allowed to scan tickets.
    #[must_use]
    pub fn greeter() -> Identity {
        Identity {
            user_id: UserId::from("usr_greeter"),
            email: "greeter@example.com".to_string(),
            role: Role::Greeter,
            groups: vec![],
        }
    }
}

pub use mocks::FixedClock;
