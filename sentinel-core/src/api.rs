//! Service boundary for the location safety core.
//!
//! [`SentinelCore`] shards state per user. Each user's ingest, zones,
//! sharing session and history sit behind one mutex, so mutating calls for
//! a user are serialized while different users never contend. Events go to
//! the [`EventSink`] after that lock is released.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::config::SafetyConfig;
use crate::error::{Result, SafetyError};
use crate::events::{CoreEvent, EventSink, NoopSink};
use crate::history::{EntryId, HistoryEntry, HistoryLog, HistoryRange, NewHistoryEntry};
use crate::location::{GeoSampleIngest, Position, RawPosition, SharedLocation};
use crate::sharing::{
    ContactId, SharingSession, SharingSessionManager, SharingStatus, StoppedSession,
};
use crate::zone::{
    NewZone, SafeZone, SafeZoneEvaluator, ZoneId, ZoneKind, ZoneMembership, ZoneTransition,
    ZoneUpdate,
};

/// Identifier of the user that owns a slice of state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Everything the core keeps for one user.
#[derive(Debug)]
struct UserSafety {
    ingest: GeoSampleIngest,
    zones: SafeZoneEvaluator,
    sharing: SharingSessionManager,
    history: HistoryLog,
}

impl UserSafety {
    fn new(config: &SafetyConfig) -> Self {
        Self {
            ingest: GeoSampleIngest::new(),
            zones: SafeZoneEvaluator::new(config.zone_limits()),
            sharing: SharingSessionManager::new(config.max_sharing_minutes),
            history: HistoryLog::new(),
        }
    }
}

/// Entry point for all location safety operations.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use sentinel_core::location::Position;
/// use sentinel_core::sharing::ContactId;
/// use sentinel_core::zone::ZoneKind;
/// use sentinel_core::{SentinelCore, UserId};
///
/// let core = SentinelCore::new();
/// let user = UserId::new("alice");
/// let home = Position::new(28.6139, 77.2090, Utc::now()).unwrap();
///
/// core.create_zone(&user, "Home", home, 500.0, ZoneKind::Home).unwrap();
/// let transitions = core.evaluate(&user, &home).unwrap();
/// assert_eq!(transitions.len(), 1);
///
/// let session = core.enable_sharing(&user, [ContactId(1), ContactId(2)], 60).unwrap();
/// assert_eq!(session.contacts.len(), 2);
/// assert!(core.sharing_status(&user).is_active());
/// ```
pub struct SentinelCore {
    config: SafetyConfig,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    users: RwLock<HashMap<UserId, Arc<Mutex<UserSafety>>>>,
}

impl fmt::Debug for SentinelCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let users = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("SentinelCore")
            .field("config", &self.config)
            .field("users", &users)
            .finish_non_exhaustive()
    }
}

impl Default for SentinelCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SentinelCore {
    /// Creates a core with default configuration, the system clock, and no
    /// event consumer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SafetyConfig::default(),
            clock: Arc::new(SystemClock),
            sink: Arc::new(NoopSink),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a core with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Config`] if the configuration is invalid.
    pub fn with_config(config: SafetyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the event consumer.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Current time according to the configured clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn existing_user(&self, user: &UserId) -> Option<Arc<Mutex<UserSafety>>> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .map(Arc::clone)
    }

    fn user_state(&self, user: &UserId) -> Arc<Mutex<UserSafety>> {
        if let Some(state) = self.existing_user(user) {
            return state;
        }

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            users
                .entry(user.clone())
                .or_insert_with(|| Arc::new(Mutex::new(UserSafety::new(&self.config)))),
        )
    }

    /// Runs `f` on the user's state, creating it on first use.
    fn with_user<R>(&self, user: &UserId, f: impl FnOnce(&mut UserSafety) -> R) -> R {
        let state = self.user_state(user);
        let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Runs `f` only if the user already has state. Reads never create it.
    fn with_existing_user<R>(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut UserSafety) -> R,
    ) -> Option<R> {
        let state = self.existing_user(user)?;
        let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut guard))
    }

    fn emit_all(&self, events: Vec<CoreEvent>) {
        for event in events {
            self.sink.emit(event);
        }
    }

    fn stopped_event(user: &UserId, stopped: StoppedSession) -> CoreEvent {
        CoreEvent::SharingStopped {
            user: user.clone(),
            contacts: stopped.session.contacts,
            reason: stopped.reason,
        }
    }

    // ==================== Ingest & Evaluation ====================

    /// Validates a raw reading for `user`.
    ///
    /// Does not evaluate zones or write history; pass the result to
    /// [`evaluate`](Self::evaluate).
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidSample`] for out-of-range or stale input.
    pub fn ingest(&self, user: &UserId, raw: &RawPosition) -> Result<Position> {
        let result = self.with_user(user, |state| state.ingest.ingest(raw));
        match &result {
            Ok(_) => tracing::trace!(user = %user, source = %raw.source, "sample accepted"),
            Err(e) => {
                tracing::debug!(user = %user, source = %raw.source, error = %e, "sample rejected");
            }
        }
        result
    }

    /// Evaluates `position` against the user's zones.
    ///
    /// Every transition is appended to history as a zone-enter or zone-exit
    /// entry and emitted as an event. While a sharing session is live, an
    /// obfuscated copy of the position is emitted for its contacts.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidEntry`] if `position` is older than the
    /// last accepted history entry and would record at least one transition.
    /// Recorded membership is left untouched in that case. A stale position
    /// that flips nothing is not an error.
    pub fn evaluate(&self, user: &UserId, position: &Position) -> Result<Vec<ZoneTransition>> {
        let now = self.clock.now();
        let precision = self.config.share_precision;
        let mut events = Vec::new();

        let result = self.with_existing_user(user, |state| -> Result<Vec<ZoneTransition>> {
            if let Some(expired) = state.sharing.refresh(now) {
                events.push(Self::stopped_event(user, expired));
            }

            let transitions = state.zones.transitions(position);
            if !transitions.is_empty() && !state.history.accepts(position.timestamp()) {
                return Err(SafetyError::InvalidEntry(format!(
                    "position at {} precedes latest history entry",
                    position.timestamp()
                )));
            }

            state.zones.apply(&transitions);
            for transition in &transitions {
                state
                    .history
                    .append(NewHistoryEntry::from_transition(transition))?;
                events.push(CoreEvent::ZoneTransition {
                    user: user.clone(),
                    transition: transition.clone(),
                });
            }

            if let Some(session) = state.sharing.current() {
                events.push(CoreEvent::LocationShared {
                    user: user.clone(),
                    contacts: session.contacts.clone(),
                    location: SharedLocation::from_position(position, precision, session.end_time),
                });
            }

            Ok(transitions)
        })
        .unwrap_or_else(|| Ok(Vec::new()));

        match &result {
            Ok(transitions) => tracing::debug!(
                user = %user,
                transitions = transitions.len(),
                "position evaluated"
            ),
            Err(e) => tracing::debug!(user = %user, error = %e, "evaluation rejected"),
        }

        self.emit_all(events);
        result
    }

    /// Membership of `position` in each zone, without recording anything.
    #[must_use]
    pub fn membership(&self, user: &UserId, position: &Position) -> Vec<ZoneMembership> {
        self.with_existing_user(user, |state| state.zones.membership(position))
            .unwrap_or_default()
    }

    // ==================== Zone Operations ====================

    /// Creates a safe zone for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidRequest`] if the name or radius is
    /// invalid or the user already has the maximum number of zones.
    pub fn create_zone(
        &self,
        user: &UserId,
        name: &str,
        center: Position,
        radius_meters: f64,
        kind: ZoneKind,
    ) -> Result<SafeZone> {
        let now = self.clock.now();
        let zone = NewZone::new(name, center, radius_meters, kind);
        let zone = self.with_user(user, |state| state.zones.create_zone(zone, now))?;
        tracing::debug!(user = %user, zone = %zone.id, kind = zone.kind.as_str(), "zone created");
        Ok(zone)
    }

    /// Updates a safe zone.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::NotFound`] for an unknown zone, or
    /// [`SafetyError::InvalidRequest`] for an invalid name or radius.
    pub fn update_zone(
        &self,
        user: &UserId,
        zone_id: ZoneId,
        update: ZoneUpdate,
    ) -> Result<SafeZone> {
        let now = self.clock.now();
        let zone = self
            .with_existing_user(user, |state| state.zones.update_zone(zone_id, update, now))
            .unwrap_or_else(|| Err(SafetyError::NotFound(zone_id.to_string())))?;
        tracing::debug!(user = %user, zone = %zone_id, "zone updated");
        Ok(zone)
    }

    /// Deletes a safe zone.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::NotFound`] for an unknown zone.
    pub fn delete_zone(&self, user: &UserId, zone_id: ZoneId) -> Result<()> {
        self.with_existing_user(user, |state| state.zones.delete_zone(zone_id))
            .unwrap_or_else(|| Err(SafetyError::NotFound(zone_id.to_string())))?;
        tracing::debug!(user = %user, zone = %zone_id, "zone deleted");
        Ok(())
    }

    /// Looks up one zone.
    #[must_use]
    pub fn get_zone(&self, user: &UserId, zone_id: ZoneId) -> Option<SafeZone> {
        self.with_existing_user(user, |state| state.zones.get(zone_id).cloned())
            .flatten()
    }

    /// All zones of `user`, ordered by id.
    #[must_use]
    pub fn list_zones(&self, user: &UserId) -> Vec<SafeZone> {
        self.with_existing_user(user, |state| state.zones.zones().cloned().collect())
            .unwrap_or_default()
    }

    // ==================== Sharing ====================

    /// Starts sharing with `contacts` for `duration_minutes`, replacing any
    /// live session.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidRequest`] if `contacts` is empty or the
    /// duration is zero or above the configured maximum.
    pub fn enable_sharing(
        &self,
        user: &UserId,
        contacts: impl IntoIterator<Item = ContactId>,
        duration_minutes: u32,
    ) -> Result<SharingSession> {
        let now = self.clock.now();
        let start = self.with_user(user, |state| {
            state.sharing.enable(contacts, duration_minutes, now)
        })?;

        let mut events = Vec::with_capacity(2);
        if let Some(previous) = start.previous {
            events.push(Self::stopped_event(user, previous));
        }
        events.push(CoreEvent::SharingStarted {
            user: user.clone(),
            contacts: start.session.contacts.clone(),
            ends_at: start.session.end_time,
        });
        self.emit_all(events);

        tracing::debug!(
            user = %user,
            contacts = start.session.contacts.len(),
            ends_at = %start.session.end_time,
            "sharing enabled"
        );
        Ok(start.session)
    }

    /// Stops sharing. Succeeds when nothing is live.
    pub fn disable_sharing(&self, user: &UserId) {
        let now = self.clock.now();
        let stopped = self
            .with_existing_user(user, |state| state.sharing.disable(now))
            .flatten();
        if let Some(stopped) = stopped {
            tracing::debug!(user = %user, reason = ?stopped.reason, "sharing stopped");
            self.sink.emit(Self::stopped_event(user, stopped));
        }
    }

    /// Current sharing status. A session past its end time is reported
    /// inactive and a stop event is emitted the first time that is noticed.
    #[must_use]
    pub fn sharing_status(&self, user: &UserId) -> SharingStatus {
        let now = self.clock.now();
        let Some((expired, status)) = self.with_existing_user(user, |state| {
            let expired = state.sharing.refresh(now);
            (expired, state.sharing.status(now))
        }) else {
            return SharingStatus::Inactive;
        };
        if let Some(expired) = expired {
            tracing::debug!(user = %user, "sharing expired");
            self.sink.emit(Self::stopped_event(user, expired));
        }
        status
    }

    // ==================== History ====================

    /// Appends an entry to the user's history.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidEntry`] if the entry is older than the
    /// last accepted one, including entries since pruned.
    pub fn append_history(&self, user: &UserId, entry: NewHistoryEntry) -> Result<EntryId> {
        let result = self.with_user(user, |state| state.history.append(entry));
        if let Err(e) = &result {
            tracing::debug!(user = %user, error = %e, "history entry rejected");
        }
        result
    }

    /// Snapshot of entries with `since <= timestamp <= until`, oldest first.
    #[must_use]
    pub fn query_history(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Vec<HistoryEntry> {
        self.visit_history(user, since, until, |range| range.cloned().collect())
    }

    /// Runs `f` over a lazy view of the range without copying entries.
    ///
    /// The user's state stays locked while `f` runs.
    pub fn visit_history<R>(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        f: impl FnOnce(HistoryRange<'_>) -> R,
    ) -> R {
        if let Some(state) = self.existing_user(user) {
            let guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            return f(guard.history.query(since, until));
        }
        f(HistoryLog::new().query(since, until))
    }

    /// Drops history entries older than `cutoff`; returns how many were removed.
    pub fn prune_history_before(&self, user: &UserId, cutoff: DateTime<Utc>) -> usize {
        let removed = self
            .with_existing_user(user, |state| state.history.prune_before(cutoff))
            .unwrap_or(0);
        tracing::debug!(user = %user, removed, "history pruned");
        removed
    }

    /// Number of history entries for `user`.
    #[must_use]
    pub fn history_len(&self, user: &UserId) -> usize {
        self.with_existing_user(user, |state| state.history.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::clock::ManualClock;
    use crate::events::RecordingSink;
    use crate::history::EntryKind;
    use crate::sharing::StopReason;
    use crate::zone::TransitionKind;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn harness() -> (SentinelCore, Arc<ManualClock>, Arc<RecordingSink>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let sink = Arc::new(RecordingSink::new());
        let core = SentinelCore::new()
            .with_clock(clock.clone())
            .with_event_sink(sink.clone());
        (core, clock, sink)
    }

    fn at(lat: f64, lon: f64, minutes: i64) -> Position {
        Position::new(lat, lon, t0() + Duration::minutes(minutes)).unwrap()
    }

    #[test]
    fn with_config_rejects_invalid() {
        let config = SafetyConfig {
            max_sharing_minutes: 0,
            ..SafetyConfig::default()
        };
        assert!(matches!(
            SentinelCore::with_config(config),
            Err(SafetyError::Config(_))
        ));
    }

    #[test]
    fn debug_does_not_dump_state() {
        let (core, _, _) = harness();
        core.create_zone(&UserId::new("alice"), "Home", at(1.0, 1.0, 0), 100.0, ZoneKind::Home)
            .unwrap();
        let debug_str = format!("{core:?}");
        assert!(debug_str.contains("SentinelCore"));
        assert!(debug_str.contains("users: 1"));
    }

    #[test]
    fn reads_do_not_create_user_state() {
        let (core, _, _) = harness();
        for i in 0..100 {
            let ghost = UserId::new(format!("ghost-{i}"));
            assert_eq!(core.history_len(&ghost), 0);
            assert!(core.list_zones(&ghost).is_empty());
            assert!(core.get_zone(&ghost, ZoneId(1)).is_none());
            assert!(core.membership(&ghost, &at(1.0, 1.0, 0)).is_empty());
            assert_eq!(core.sharing_status(&ghost), SharingStatus::Inactive);
            assert!(core.query_history(&ghost, t0(), t0() + Duration::hours(1)).is_empty());
            assert!(core.evaluate(&ghost, &at(1.0, 1.0, 0)).unwrap().is_empty());
            assert_eq!(core.prune_history_before(&ghost, t0()), 0);
            core.disable_sharing(&ghost);
        }

        assert!(format!("{core:?}").contains("users: 0"));
    }

    #[test]
    fn zone_changes_for_unknown_user_are_not_found() {
        let (core, _, _) = harness();
        let ghost = UserId::new("ghost");

        assert!(matches!(
            core.delete_zone(&ghost, ZoneId(1)),
            Err(SafetyError::NotFound(_))
        ));
        assert!(matches!(
            core.update_zone(&ghost, ZoneId(1), ZoneUpdate::default()),
            Err(SafetyError::NotFound(_))
        ));
        assert!(format!("{core:?}").contains("users: 0"));
    }

    #[test]
    fn now_follows_injected_clock() {
        let (core, clock, _) = harness();
        assert_eq!(core.now(), t0());

        clock.advance(Duration::minutes(5));
        assert_eq!(core.now(), t0() + Duration::minutes(5));
    }

    #[test]
    fn users_are_isolated() {
        let (core, _, _) = harness();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        core.create_zone(&alice, "Home", at(28.6139, 77.2090, 0), 500.0, ZoneKind::Home)
            .unwrap();

        assert_eq!(core.list_zones(&alice).len(), 1);
        assert!(core.list_zones(&bob).is_empty());
        assert!(core.evaluate(&bob, &at(28.6139, 77.2090, 0)).unwrap().is_empty());
    }

    #[test]
    fn evaluate_records_history_and_emits() {
        let (core, _, sink) = harness();
        let user = UserId::new("alice");
        let zone = core
            .create_zone(&user, "Home", at(28.6139, 77.2090, 0), 500.0, ZoneKind::Home)
            .unwrap();

        let transitions = core.evaluate(&user, &at(28.6139, 77.2090, 1)).unwrap();

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].zone_id, zone.id);
        let history = core.query_history(&user, t0(), t0() + Duration::hours(1));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, EntryKind::ZoneEnter);
        assert_eq!(history[0].description, "Entered Home");

        let events = sink.take();
        assert!(matches!(
            &events[..],
            [CoreEvent::ZoneTransition { transition, .. }]
                if transition.kind == TransitionKind::Enter
        ));
    }

    #[test]
    fn evaluate_rejects_position_older_than_history() {
        let (core, _, _) = harness();
        let user = UserId::new("alice");
        let zone = core
            .create_zone(&user, "Home", at(28.6139, 77.2090, 0), 500.0, ZoneKind::Home)
            .unwrap();
        core.append_history(&user, NewHistoryEntry::movement(at(0.0, 0.0, 30), "walk"))
            .unwrap();

        let err = core.evaluate(&user, &at(28.6139, 77.2090, 10)).unwrap_err();

        assert!(matches!(err, SafetyError::InvalidEntry(_)));
        assert_eq!(core.history_len(&user), 1);
        // Membership was not recorded, so a valid fix still reports the enter.
        assert_eq!(core.evaluate(&user, &at(28.6139, 77.2090, 31)).unwrap()[0].zone_id, zone.id);
    }

    #[test]
    fn stale_position_without_zones_is_not_an_error() {
        let (core, _, _) = harness();
        let user = UserId::new("alice");
        core.append_history(&user, NewHistoryEntry::movement(at(0.0, 0.0, 30), "walk"))
            .unwrap();

        let transitions = core.evaluate(&user, &at(28.6139, 77.2090, 10)).unwrap();

        assert!(transitions.is_empty());
        assert_eq!(core.history_len(&user), 1);
    }

    #[test]
    fn stale_position_without_flip_is_not_an_error() {
        let (core, _, _) = harness();
        let user = UserId::new("alice");
        let zone = core
            .create_zone(&user, "Home", at(28.6139, 77.2090, 0), 500.0, ZoneKind::Home)
            .unwrap();
        core.evaluate(&user, &at(28.6139, 77.2090, 20)).unwrap();
        core.append_history(&user, NewHistoryEntry::movement(at(28.6139, 77.2090, 30), "sit"))
            .unwrap();

        // Both fixes are still inside, so nothing would be recorded.
        assert!(core.evaluate(&user, &at(28.6140, 77.2090, 10)).unwrap().is_empty());
        assert!(core.evaluate(&user, &at(28.6139, 77.2090, 15)).unwrap().is_empty());
        assert_eq!(core.history_len(&user), 2);
        assert_eq!(core.get_zone(&user, zone.id).map(|zone| zone.name), Some("Home".into()));
    }

    #[test]
    fn append_after_full_prune_keeps_ordering() {
        let (core, _, _) = harness();
        let user = UserId::new("alice");
        for m in [0, 5] {
            core.append_history(&user, NewHistoryEntry::movement(at(1.0, 1.0, m), "fix"))
                .unwrap();
        }

        assert_eq!(core.prune_history_before(&user, t0() + Duration::minutes(60)), 2);
        let err = core
            .append_history(&user, NewHistoryEntry::movement(at(1.0, 1.0, 1), "late"))
            .unwrap_err();

        assert!(matches!(err, SafetyError::InvalidEntry(_)));
        assert_eq!(core.history_len(&user), 0);
    }

    #[test]
    fn sharing_emits_start_and_shared_locations() {
        let (core, _, sink) = harness();
        let user = UserId::new("alice");

        let session = core
            .enable_sharing(&user, [ContactId(1), ContactId(2)], 60)
            .unwrap();
        assert_eq!(session.end_time, t0() + Duration::minutes(60));

        core.evaluate(&user, &at(37.774_929_5, -122.419_415_5, 1)).unwrap();

        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            CoreEvent::SharingStarted { contacts, .. } if contacts.len() == 2
        ));
        let CoreEvent::LocationShared { location, .. } = &events[1] else {
            panic!("expected shared location, got {:?}", events[1]);
        };
        assert_eq!(location.latitude, 37.774_93);
        assert_eq!(location.expires_at, session.end_time);
    }

    #[test]
    fn sharing_expires_without_disable() {
        let (core, clock, sink) = harness();
        let user = UserId::new("alice");
        core.enable_sharing(&user, [ContactId(1)], 60).unwrap();
        sink.take();

        clock.advance(Duration::minutes(61));

        assert_eq!(core.sharing_status(&user), SharingStatus::Inactive);
        assert!(matches!(
            &sink.take()[..],
            [CoreEvent::SharingStopped { reason: StopReason::Expired, .. }]
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn no_shared_location_after_expiry() {
        let (core, clock, sink) = harness();
        let user = UserId::new("alice");
        core.enable_sharing(&user, [ContactId(1)], 10).unwrap();
        sink.take();

        clock.advance(Duration::minutes(10));
        core.evaluate(&user, &at(1.0, 1.0, 10)).unwrap();

        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            CoreEvent::SharingStopped { reason: StopReason::Expired, .. }
        ));
    }

    #[test]
    fn disable_emits_stop_once() {
        let (core, _, sink) = harness();
        let user = UserId::new("alice");
        core.enable_sharing(&user, [ContactId(1)], 60).unwrap();
        sink.take();

        core.disable_sharing(&user);
        core.disable_sharing(&user);

        assert_eq!(sink.len(), 1);
        assert!(!core.sharing_status(&user).is_active());
    }

    #[test]
    fn visit_history_is_lazy_view() {
        let (core, _, _) = harness();
        let user = UserId::new("alice");
        for m in 0..5 {
            core.append_history(&user, NewHistoryEntry::movement(at(1.0, 1.0, m), "fix"))
                .unwrap();
        }

        let until = t0() + Duration::minutes(2);
        let ids: Vec<EntryId> = core.visit_history(&user, t0(), until, |range| {
            range.map(|entry| entry.id).collect()
        });
        assert_eq!(ids, vec![EntryId(1), EntryId(2), EntryId(3)]);

        assert_eq!(core.prune_history_before(&user, t0() + Duration::minutes(3)), 3);
        assert_eq!(core.history_len(&user), 2);
    }
}
