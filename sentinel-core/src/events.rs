//! Outbound signals for external collaborators.
//!
//! The core never addresses a notification dispatcher or contact directory
//! directly. It hands opaque contact ids and payloads to an [`EventSink`]
//! and moves on; delivery failures are the sink's problem.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::api::UserId;
use crate::location::SharedLocation;
use crate::sharing::{ContactId, StopReason};
use crate::zone::ZoneTransition;

/// An event emitted by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// A user's position entered or left a safe zone.
    ZoneTransition {
        /// Owner of the zone.
        user: UserId,
        /// The transition.
        transition: ZoneTransition,
    },
    /// A sharing session started.
    SharingStarted {
        /// User sharing their location.
        user: UserId,
        /// Contacts to notify.
        contacts: BTreeSet<ContactId>,
        /// When sharing stops.
        ends_at: DateTime<Utc>,
    },
    /// A sharing session stopped.
    SharingStopped {
        /// User that was sharing.
        user: UserId,
        /// Contacts that lost access.
        contacts: BTreeSet<ContactId>,
        /// Why it stopped.
        reason: StopReason,
    },
    /// A fresh, obfuscated position for the contacts of a live session.
    LocationShared {
        /// User sharing their location.
        user: UserId,
        /// Recipients.
        contacts: BTreeSet<ContactId>,
        /// Obfuscated location.
        location: SharedLocation,
    },
}

/// Receives events from the core. Must not block.
pub trait EventSink: Send + Sync {
    /// Accepts one event. Fire-and-forget: there is no way to report failure.
    fn emit(&self, event: CoreEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: CoreEvent) {}
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingSink;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use std::sync::{Mutex, PoisonError};

    use super::{CoreEvent, EventSink};

    /// Keeps every emitted event for later inspection.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<CoreEvent>>,
    }

    impl RecordingSink {
        /// Creates an empty sink.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Removes and returns everything recorded so far.
        pub fn take(&self) -> Vec<CoreEvent> {
            std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
        }

        /// Number of events recorded and not yet taken.
        pub fn len(&self) -> usize {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing is recorded.
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: CoreEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }
}
