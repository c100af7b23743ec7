//! Types for time-bounded location sharing.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Opaque contact identifier, resolved to a notification target by an
/// external contact directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contact-{}", self.0)
    }
}

impl From<u64> for ContactId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A grant letting a set of contacts see the user's location until `end_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingSession {
    /// Contacts that can see the location.
    pub contacts: BTreeSet<ContactId>,
    /// When sharing began.
    pub start_time: DateTime<Utc>,
    /// When sharing stops. Always at or after `start_time`.
    pub end_time: DateTime<Utc>,
    /// Whether the session is still live.
    pub active: bool,
}

impl SharingSession {
    /// Time left at `now`, or zero once the session has ended.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if !self.active || now >= self.end_time {
            return Duration::zero();
        }
        self.end_time - now
    }

    /// Whether the session has run out at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }
}

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingStatus {
    /// A session is live.
    Active(SharingSession),
    /// No session is live.
    Inactive,
}

impl SharingStatus {
    /// Whether sharing is currently on.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The live session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&SharingSession> {
        match self {
            Self::Active(session) => Some(session),
            Self::Inactive => None,
        }
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user turned sharing off.
    Disabled,
    /// The end time passed.
    Expired,
    /// A new `enable` overwrote it.
    Replaced,
}

/// A session that just stopped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedSession {
    /// The session, with `active` cleared.
    pub session: SharingSession,
    /// Why it stopped.
    pub reason: StopReason,
}

/// Outcome of enabling sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    /// The new live session.
    pub session: SharingSession,
    /// The session that was live (or lapsed) before, if any.
    pub previous: Option<StoppedSession>,
}
