//! API bridging layer that exposes sentinel-core functionality.
//!
//! Timestamps cross the bridge as Unix seconds and errors as display
//! strings, so the Flutter side can show them inline.

use chrono::{DateTime, Utc};
use flutter_rust_bridge::frb;
use sentinel_core::history::{EntryKind, HistoryEntry, NewHistoryEntry};
use sentinel_core::location::{Position, RawPosition};
use sentinel_core::sharing::{ContactId, SharingSession, SharingStatus};
use sentinel_core::zone::{SafeZone, TransitionKind, ZoneId, ZoneKind, ZoneTransition, ZoneUpdate};
use sentinel_core::UserId;

fn to_datetime(unix_seconds: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp(unix_seconds, 0)
        .ok_or_else(|| format!("Invalid timestamp: {unix_seconds}"))
}

fn parse_kind(kind: &str) -> Result<ZoneKind, String> {
    ZoneKind::parse(kind).ok_or_else(|| format!("Invalid zone kind: {kind}"))
}

/// Core interface for Sentinel functionality (wrapper around sentinel-core).
#[derive(Debug, Default)]
#[frb(opaque)]
pub struct SentinelCore {
    inner: sentinel_core::SentinelCore,
}

impl SentinelCore {
    /// Creates a new `SentinelCore` instance with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: sentinel_core::SentinelCore::new(),
        }
    }

    /// Creates an instance from a JSON configuration.
    pub fn with_config_json(json: String) -> Result<Self, String> {
        let config = sentinel_core::SafetyConfig::from_json(&json).map_err(|e| e.to_string())?;
        let inner = sentinel_core::SentinelCore::with_config(config).map_err(|e| e.to_string())?;
        Ok(Self { inner })
    }

    #[cfg(test)]
    fn from_inner(inner: sentinel_core::SentinelCore) -> Self {
        Self { inner }
    }

    /// Validates a raw reading from the platform geolocation API.
    #[frb(sync)]
    pub fn ingest(
        &self,
        user_id: String,
        source: String,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
        accuracy_meters: Option<f64>,
    ) -> Result<PositionView, String> {
        let timestamp = to_datetime(timestamp)?;
        let mut raw = RawPosition::new(source.as_str(), latitude, longitude, timestamp);
        raw.accuracy_meters = accuracy_meters;
        self.inner
            .ingest(&UserId::new(user_id), &raw)
            .map(PositionView::from)
            .map_err(|e| e.to_string())
    }

    /// Evaluates a position against the user's safe zones.
    #[frb(sync)]
    pub fn evaluate(
        &self,
        user_id: String,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
    ) -> Result<Vec<TransitionView>, String> {
        let position =
            Position::new(latitude, longitude, to_datetime(timestamp)?).map_err(|e| e.to_string())?;
        self.inner
            .evaluate(&UserId::new(user_id), &position)
            .map(|transitions| transitions.into_iter().map(TransitionView::from).collect())
            .map_err(|e| e.to_string())
    }

    /// Creates a safe zone. `kind` is one of `home`, `work`, `custom`.
    #[frb(sync)]
    pub fn create_zone(
        &self,
        user_id: String,
        name: String,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        kind: String,
    ) -> Result<ZoneView, String> {
        let kind = parse_kind(&kind)?;
        let center = Position::new(latitude, longitude, self.inner.now())
            .map_err(|e| e.to_string())?;
        self.inner
            .create_zone(&UserId::new(user_id), &name, center, radius_meters, kind)
            .map(ZoneView::from)
            .map_err(|e| e.to_string())
    }

    /// Renames or resizes a safe zone. `None` leaves a field unchanged.
    #[frb(sync)]
    pub fn update_zone(
        &self,
        user_id: String,
        zone_id: u64,
        name: Option<String>,
        radius_meters: Option<f64>,
        kind: Option<String>,
    ) -> Result<ZoneView, String> {
        let update = ZoneUpdate {
            name,
            center: None,
            radius_meters,
            kind: kind.as_deref().map(parse_kind).transpose()?,
        };
        self.inner
            .update_zone(&UserId::new(user_id), ZoneId(zone_id), update)
            .map(ZoneView::from)
            .map_err(|e| e.to_string())
    }

    /// Deletes a safe zone.
    #[frb(sync)]
    pub fn delete_zone(&self, user_id: String, zone_id: u64) -> Result<(), String> {
        self.inner
            .delete_zone(&UserId::new(user_id), ZoneId(zone_id))
            .map_err(|e| e.to_string())
    }

    /// Lists the user's safe zones.
    #[frb(sync)]
    #[must_use]
    pub fn list_zones(&self, user_id: String) -> Vec<ZoneView> {
        self.inner
            .list_zones(&UserId::new(user_id))
            .into_iter()
            .map(ZoneView::from)
            .collect()
    }

    /// Starts sharing location with contacts.
    #[frb(sync)]
    pub fn enable_sharing(
        &self,
        user_id: String,
        contacts: Vec<u64>,
        duration_minutes: u32,
    ) -> Result<SharingView, String> {
        self.inner
            .enable_sharing(
                &UserId::new(user_id),
                contacts.into_iter().map(ContactId),
                duration_minutes,
            )
            .map(|session| SharingView::from(&session))
            .map_err(|e| e.to_string())
    }

    /// Stops sharing location.
    #[frb(sync)]
    pub fn disable_sharing(&self, user_id: String) {
        self.inner.disable_sharing(&UserId::new(user_id));
    }

    /// Gets the current sharing status.
    #[frb(sync)]
    #[must_use]
    pub fn sharing_status(&self, user_id: String) -> SharingView {
        match self.inner.sharing_status(&UserId::new(user_id)) {
            SharingStatus::Active(session) => SharingView::from(&session),
            SharingStatus::Inactive => SharingView::inactive(),
        }
    }

    /// Records a movement entry in the user's history.
    #[frb(sync)]
    pub fn record_movement(
        &self,
        user_id: String,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
        description: String,
    ) -> Result<u64, String> {
        let position =
            Position::new(latitude, longitude, to_datetime(timestamp)?).map_err(|e| e.to_string())?;
        self.inner
            .append_history(
                &UserId::new(user_id),
                NewHistoryEntry::movement(position, description),
            )
            .map(|id| id.0)
            .map_err(|e| e.to_string())
    }

    /// History entries between `since` and `until` (inclusive), oldest first.
    #[frb(sync)]
    pub fn query_history(
        &self,
        user_id: String,
        since: i64,
        until: i64,
    ) -> Result<Vec<HistoryView>, String> {
        let (since, until) = (to_datetime(since)?, to_datetime(until)?);
        Ok(self
            .inner
            .query_history(&UserId::new(user_id), since, until)
            .iter()
            .map(HistoryView::from)
            .collect())
    }
}

/// Validated position (FFI view).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
}

impl From<Position> for PositionView {
    fn from(position: Position) -> Self {
        Self {
            latitude: position.latitude(),
            longitude: position.longitude(),
            timestamp: position.timestamp().timestamp(),
        }
    }
}

/// Safe zone (FFI view).
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneView {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub kind: String,
}

impl From<SafeZone> for ZoneView {
    fn from(zone: SafeZone) -> Self {
        Self {
            id: zone.id.0,
            latitude: zone.center.latitude(),
            longitude: zone.center.longitude(),
            name: zone.name,
            radius_meters: zone.radius_meters,
            kind: zone.kind.as_str().to_string(),
        }
    }
}

/// Zone enter/exit (FFI view).
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionView {
    pub zone_id: u64,
    pub zone_name: String,
    pub entered: bool,
    pub distance_meters: f64,
    pub description: String,
}

impl From<ZoneTransition> for TransitionView {
    fn from(transition: ZoneTransition) -> Self {
        Self {
            zone_id: transition.zone_id.0,
            entered: transition.kind == TransitionKind::Enter,
            distance_meters: transition.distance_meters,
            description: transition.describe(),
            zone_name: transition.zone_name,
        }
    }
}

/// Sharing status (FFI view). Times are zero when inactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharingView {
    pub active: bool,
    pub contacts: Vec<u64>,
    pub start_time: i64,
    pub end_time: i64,
}

impl SharingView {
    const fn inactive() -> Self {
        Self {
            active: false,
            contacts: Vec::new(),
            start_time: 0,
            end_time: 0,
        }
    }
}

impl From<&SharingSession> for SharingView {
    fn from(session: &SharingSession) -> Self {
        Self {
            active: session.active,
            contacts: session.contacts.iter().map(|contact| contact.0).collect(),
            start_time: session.start_time.timestamp(),
            end_time: session.end_time.timestamp(),
        }
    }
}

/// History entry (FFI view). `kind` is `movement`, `zone-enter` or `zone-exit`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub id: u64,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
    pub description: String,
}

impl From<&HistoryEntry> for HistoryView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.0,
            kind: entry.kind.as_str().to_string(),
            latitude: entry.position.latitude(),
            longitude: entry.position.longitude(),
            timestamp: entry.timestamp.timestamp(),
            description: entry.description.clone(),
        }
    }
}

impl HistoryView {
    /// Whether this entry is a zone transition rather than a plain fix.
    #[frb(sync)]
    #[must_use]
    pub fn is_zone_event(&self) -> bool {
        self.kind != EntryKind::Movement.as_str()
    }
}
