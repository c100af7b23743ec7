//! Location data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SafetyError};

/// Precision level for coordinate obfuscation.
///
/// Determines how many decimal places are retained when a position is
/// shared with contacts. Lower precision means more privacy but less accuracy.
///
/// # Precision Table
///
/// | Precision | Decimal Places | Approximate Radius |
/// |-----------|----------------|-------------------|
/// | Private   | 2              | ~1.1 km           |
/// | Standard  | 4              | ~11 m             |
/// | Enhanced  | 5              | ~1.1 m            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LocationPrecision {
    /// 2 decimal places (~1.1km radius) - maximum privacy
    Private,
    /// 4 decimal places (~11m radius) - balanced privacy and accuracy
    Standard,
    /// 5 decimal places (~1.1m radius) - default for trusted contacts
    #[default]
    Enhanced,
}

impl LocationPrecision {
    /// Returns the number of decimal places for this precision level.
    #[must_use]
    pub const fn decimal_places(self) -> i32 {
        match self {
            Self::Private => 2,
            Self::Standard => 4,
            Self::Enhanced => 5,
        }
    }
}

/// Identifies where a raw reading came from (e.g. `"gps"`, `"network"`).
///
/// Staleness is tracked per source, so a coarse network fix arriving late
/// does not invalidate a fresher GPS fix or vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a source identifier.
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

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A position reading as delivered by a geolocation source, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Source that produced the reading.
    pub source: SourceId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the fix was taken (UTC).
    pub timestamp: DateTime<Utc>,
    /// Reported horizontal accuracy in meters, if the source provides one.
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
}

impl RawPosition {
    /// Creates a raw reading without an accuracy estimate.
    #[must_use]
    pub fn new(
        source: impl Into<SourceId>,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            source: source.into(),
            latitude,
            longitude,
            timestamp,
            accuracy_meters: None,
        }
    }

    /// Attaches a horizontal accuracy estimate.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Self {
        self.accuracy_meters = Some(accuracy_meters);
        self
    }
}

/// A validated position. Immutable once created.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use sentinel_core::location::Position;
///
/// let position = Position::new(28.6139, 77.2090, Utc::now()).unwrap();
/// assert_eq!(position.latitude(), 28.6139);
///
/// assert!(Position::new(91.0, 0.0, Utc::now()).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PositionFields")]
pub struct Position {
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
}

impl Position {
    /// Creates a position after checking coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidSample`] if latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either is not finite.
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SafetyError::InvalidSample(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SafetyError::InvalidSample(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            timestamp,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// When the fix was taken (UTC).
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns a copy of this position re-stamped at `timestamp`.
    #[must_use]
    pub const fn at(self, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp,
        }
    }

    /// Geohash of this position at the given length.
    #[must_use]
    pub fn geohash(&self, precision: u8) -> String {
        super::privacy::location_to_geohash(self.latitude, self.longitude, precision)
    }
}

#[derive(Deserialize)]
struct PositionFields {
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
}

impl TryFrom<PositionFields> for Position {
    type Error = SafetyError;

    fn try_from(fields: PositionFields) -> Result<Self> {
        Self::new(fields.latitude, fields.longitude, fields.timestamp)
    }
}

/// A position prepared for delivery to sharing contacts.
///
/// Coordinates are obfuscated to the configured precision before this value
/// is built, and the raw position is never carried along. Every shared
/// location expires when the sharing session that produced it ends.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use sentinel_core::location::{LocationPrecision, Position, SharedLocation};
///
/// let now = Utc::now();
/// let position = Position::new(37.7749295, -122.4194155, now).unwrap();
/// let shared = SharedLocation::from_position(
///     &position,
///     LocationPrecision::Private,
///     now + Duration::minutes(30),
/// );
/// assert_eq!(shared.latitude, 37.77);
/// assert_eq!(shared.longitude, -122.42);
/// assert!(!shared.is_expired_at(now));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedLocation {
    /// Obfuscated latitude (precision determined by `precision` field)
    pub latitude: f64,

    /// Obfuscated longitude (precision determined by `precision` field)
    pub longitude: f64,

    /// Geohash of the obfuscated coordinates
    pub geohash: String,

    /// When the underlying fix was taken (UTC)
    pub timestamp: DateTime<Utc>,

    /// When contacts must stop displaying this location
    pub expires_at: DateTime<Utc>,

    /// Precision level used for obfuscation
    pub precision: LocationPrecision,
}

impl SharedLocation {
    /// Geohash length attached to shared locations (~19m x 19m cell).
    pub const GEOHASH_PRECISION: u8 = 8;

    /// Builds a shared location from a validated position.
    #[must_use]
    pub fn from_position(
        position: &Position,
        precision: LocationPrecision,
        expires_at: DateTime<Utc>,
    ) -> Self {
        use super::privacy::{location_to_geohash, obfuscate_coordinate};

        let latitude = obfuscate_coordinate(position.latitude(), precision);
        let longitude = obfuscate_coordinate(position.longitude(), precision);

        Self {
            latitude,
            longitude,
            geohash: location_to_geohash(latitude, longitude, Self::GEOHASH_PRECISION),
            timestamp: position.timestamp(),
            expires_at,
            precision,
        }
    }

    /// Checks whether this location has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Creates a `SharedLocation` from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or missing required fields.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Converts this `SharedLocation` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (extremely rare).
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
