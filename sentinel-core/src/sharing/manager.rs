//! Sharing session state machine (Inactive / Active).
//!
//! Expiry is checked lazily whenever the manager is touched; there is no
//! background timer.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use super::types::{
    ContactId, SessionStart, SharingSession, SharingStatus, StopReason, StoppedSession,
};
use crate::error::{Result, SafetyError};

/// Tracks the single sharing session of one user.
#[derive(Debug, Clone)]
pub struct SharingSessionManager {
    max_duration_minutes: u32,
    session: Option<SharingSession>,
}

impl Default for SharingSessionManager {
    fn default() -> Self {
        Self::new(24 * 60)
    }
}

impl SharingSessionManager {
    /// Creates an inactive manager that accepts durations up to `max_duration_minutes`.
    #[must_use]
    pub const fn new(max_duration_minutes: u32) -> Self {
        Self {
            max_duration_minutes,
            session: None,
        }
    }

    /// Starts sharing with `contacts` for `duration_minutes`.
    ///
    /// Calling this while a session is live replaces it outright; contacts
    /// are not merged.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidRequest`] if `contacts` is empty or the
    /// duration is zero or above the configured maximum. The current session
    /// is left untouched on error.
    pub fn enable(
        &mut self,
        contacts: impl IntoIterator<Item = ContactId>,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<SessionStart> {
        let contacts: BTreeSet<ContactId> = contacts.into_iter().collect();
        if contacts.is_empty() {
            return Err(SafetyError::InvalidRequest(
                "sharing needs at least one contact".to_string(),
            ));
        }
        if duration_minutes == 0 {
            return Err(SafetyError::InvalidRequest(
                "sharing duration must be positive".to_string(),
            ));
        }
        if duration_minutes > self.max_duration_minutes {
            return Err(SafetyError::InvalidRequest(format!(
                "sharing duration {duration_minutes} min exceeds limit of {} min",
                self.max_duration_minutes
            )));
        }

        let previous = self.refresh(now).or_else(|| {
            self.session.take().map(|mut session| {
                session.active = false;
                StoppedSession {
                    session,
                    reason: StopReason::Replaced,
                }
            })
        });

        let session = SharingSession {
            contacts,
            start_time: now,
            end_time: now + Duration::minutes(i64::from(duration_minutes)),
            active: true,
        };
        self.session = Some(session.clone());

        Ok(SessionStart { session, previous })
    }

    /// Stops sharing. Succeeds even when nothing is live.
    ///
    /// Returns the stopped session. A session whose end time had already
    /// passed is reported as expired rather than disabled.
    pub fn disable(&mut self, now: DateTime<Utc>) -> Option<StoppedSession> {
        if let Some(expired) = self.refresh(now) {
            return Some(expired);
        }
        self.session.take().map(|mut session| {
            session.active = false;
            StoppedSession {
                session,
                reason: StopReason::Disabled,
            }
        })
    }

    /// Invalidates the session if its end time has passed, returning it.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Option<StoppedSession> {
        if !self
            .session
            .as_ref()
            .is_some_and(|session| session.is_expired_at(now))
        {
            return None;
        }
        self.session.take().map(|mut session| {
            session.active = false;
            StoppedSession {
                session,
                reason: StopReason::Expired,
            }
        })
    }

    /// Current status at `now`, expiring the session first if due.
    pub fn status(&mut self, now: DateTime<Utc>) -> SharingStatus {
        self.refresh(now);
        self.session
            .clone()
            .map_or(SharingStatus::Inactive, SharingStatus::Active)
    }

    /// The live session as last seen, without checking expiry.
    #[must_use]
    pub const fn current(&self) -> Option<&SharingSession> {
        self.session.as_ref()
    }
}
