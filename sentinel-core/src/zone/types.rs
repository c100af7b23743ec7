//! Core types for safe zones.
//!
//! A safe zone is a circular geofence around a named place. Membership in a
//! zone is derived per evaluation; only the flips between inside and outside
//! are reported.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SafetyError};
use crate::location::geo::haversine_distance;
use crate::location::Position;

/// Identifier of a safe zone, unique per user.
///
/// Ids are handed out in creation order, which also fixes the order in
/// which simultaneous transitions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone-{}", self.0)
    }
}

/// What kind of place a zone marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// The user's home.
    Home,
    /// A workplace or school.
    Work,
    /// Any other user-named place.
    #[default]
    Custom,
}

impl ZoneKind {
    /// Converts to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
            Self::Custom => "custom",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "home" => Some(Self::Home),
            "work" => Some(Self::Work),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// A circular safe zone owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    /// Unique id within the owning user's zones.
    pub id: ZoneId,
    /// User-facing name.
    pub name: String,
    /// Center of the circle.
    pub center: Position,
    /// Radius in meters, within the configured bounds.
    pub radius_meters: f64,
    /// Kind of place.
    pub kind: ZoneKind,
    /// When the zone was created.
    pub created_at: DateTime<Utc>,
    /// When the zone was last changed.
    pub updated_at: DateTime<Utc>,
}

impl SafeZone {
    /// Great-circle distance in meters from the zone center to `position`.
    #[must_use]
    pub fn distance_to(&self, position: &Position) -> f64 {
        haversine_distance(&self.center, position)
    }

    /// Membership of `position` in this zone. The boundary counts as inside.
    #[must_use]
    pub fn membership(&self, position: &Position) -> ZoneMembership {
        let distance_meters = self.distance_to(position);
        ZoneMembership {
            zone_id: self.id,
            inside: distance_meters <= self.radius_meters,
            distance_meters,
        }
    }

    /// Whether `position` lies inside the zone.
    #[must_use]
    pub fn contains(&self, position: &Position) -> bool {
        self.membership(position).inside
    }
}

/// Parameters for a new zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewZone {
    /// User-facing name (trimmed before storing).
    pub name: String,
    /// Center of the circle.
    pub center: Position,
    /// Radius in meters.
    pub radius_meters: f64,
    /// Kind of place.
    #[serde(default)]
    pub kind: ZoneKind,
}

impl NewZone {
    /// Creates zone parameters.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        center: Position,
        radius_meters: f64,
        kind: ZoneKind,
    ) -> Self {
        Self {
            name: name.into(),
            center,
            radius_meters,
            kind,
        }
    }
}

/// Partial update of an existing zone. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    /// New name.
    pub name: Option<String>,
    /// New center.
    pub center: Option<Position>,
    /// New radius in meters.
    pub radius_meters: Option<f64>,
    /// New kind.
    pub kind: Option<ZoneKind>,
}

/// Bounds applied to zone creation and updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLimits {
    /// Smallest allowed radius (inclusive).
    pub min_radius_meters: f64,
    /// Largest allowed radius (inclusive).
    pub max_radius_meters: f64,
    /// Maximum number of zones per user.
    pub max_zones: usize,
    /// Maximum zone name length in characters.
    pub max_name_len: usize,
}

impl Default for ZoneLimits {
    fn default() -> Self {
        Self {
            min_radius_meters: 50.0,
            max_radius_meters: 2_000.0,
            max_zones: 20,
            max_name_len: 64,
        }
    }
}

impl ZoneLimits {
    /// Trims and checks a zone name.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidRequest`] if the name is blank or too long.
    pub fn check_name(&self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SafetyError::InvalidRequest(
                "zone name must not be empty".to_string(),
            ));
        }
        let len = trimmed.chars().count();
        if len > self.max_name_len {
            return Err(SafetyError::InvalidRequest(format!(
                "zone name is {len} characters, limit is {}",
                self.max_name_len
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Checks a radius against the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidRequest`] if the radius is not finite or
    /// falls outside `[min_radius_meters, max_radius_meters]`.
    pub fn check_radius(&self, radius_meters: f64) -> Result<()> {
        if radius_meters.is_finite()
            && (self.min_radius_meters..=self.max_radius_meters).contains(&radius_meters)
        {
            Ok(())
        } else {
            Err(SafetyError::InvalidRequest(format!(
                "radius {radius_meters}m outside [{}, {}]",
                self.min_radius_meters, self.max_radius_meters
            )))
        }
    }
}

/// Derived membership of a position in one zone. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneMembership {
    /// Zone this membership refers to.
    pub zone_id: ZoneId,
    /// Whether the position is inside (boundary included).
    pub inside: bool,
    /// Distance from the zone center in meters.
    pub distance_meters: f64,
}

/// Direction of a geofence transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Outside to inside.
    Enter,
    /// Inside to outside.
    Exit,
}

/// An enter or exit event for one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTransition {
    /// Zone that was entered or left.
    pub zone_id: ZoneId,
    /// Zone name at the time of the transition.
    pub zone_name: String,
    /// Direction of the flip.
    pub kind: TransitionKind,
    /// Position that caused the flip.
    pub position: Position,
    /// Distance from the zone center in meters.
    pub distance_meters: f64,
}

impl ZoneTransition {
    /// Short human-readable summary, e.g. `"Entered Home"`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TransitionKind::Enter => format!("Entered {}", self.zone_name),
            TransitionKind::Exit => format!("Left {}", self.zone_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Position {
        Position::new(28.6139, 77.2090, Utc::now()).unwrap()
    }

    fn zone(radius: f64) -> SafeZone {
        SafeZone {
            id: ZoneId(1),
            name: "Home".to_string(),
            center: center(),
            radius_meters: radius,
            kind: ZoneKind::Home,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn membership_reports_distance_and_boundary() {
        let zone = zone(500.0);
        let far = Position::new(28.7, 77.2090, Utc::now()).unwrap();

        let at_center = zone.membership(&center());
        assert_eq!(at_center.zone_id, zone.id);
        assert!(at_center.inside);
        assert_eq!(at_center.distance_meters, 0.0);

        let outside = zone.membership(&far);
        assert!(!outside.inside);
        assert_eq!(outside.distance_meters, zone.distance_to(&far));
        assert_eq!(zone.contains(&far), outside.inside);
    }

    #[test]
    fn zone_kind_roundtrip() {
        for kind in [ZoneKind::Home, ZoneKind::Work, ZoneKind::Custom] {
            assert_eq!(ZoneKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ZoneKind::parse("school"), None);
    }

    #[test]
    fn zone_id_display() {
        assert_eq!(ZoneId(42).to_string(), "zone-42");
    }

    #[test]
    fn center_is_inside() {
        let zone = zone(500.0);
        assert_eq!(zone.distance_to(&center()), 0.0);
        assert!(zone.contains(&center()));
    }

    #[test]
    fn boundary_counts_as_inside() {
        let far = Position::new(28.6239, 77.2090, Utc::now()).unwrap();
        let exact = zone(500.0).distance_to(&far);

        assert!(zone(exact).contains(&far));
        assert!(!zone(exact - 0.001).contains(&far));
    }

    #[test]
    fn limits_check_name() {
        let limits = ZoneLimits::default();
        assert_eq!(limits.check_name("  Office  ").unwrap(), "Office");
        assert!(limits.check_name("   ").is_err());
        assert!(limits.check_name(&"x".repeat(65)).is_err());
        assert!(limits.check_name(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn limits_check_radius() {
        let limits = ZoneLimits::default();
        assert!(limits.check_radius(50.0).is_ok());
        assert!(limits.check_radius(2_000.0).is_ok());
        assert!(limits.check_radius(49.9).is_err());
        assert!(limits.check_radius(2_000.1).is_err());
        assert!(limits.check_radius(f64::NAN).is_err());
        assert!(matches!(
            limits.check_radius(0.0),
            Err(SafetyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn transition_describe() {
        let mut transition = ZoneTransition {
            zone_id: ZoneId(1),
            zone_name: "Work".to_string(),
            kind: TransitionKind::Enter,
            position: center(),
            distance_meters: 0.0,
        };
        assert_eq!(transition.describe(), "Entered Work");

        transition.kind = TransitionKind::Exit;
        assert_eq!(transition.describe(), "Left Work");
    }
}
