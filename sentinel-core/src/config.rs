//! Configuration for the location safety core.
//!
//! Settings are plain JSON so the host app can ship them alongside its own
//! preferences. Missing fields fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafetyError};
use crate::location::LocationPrecision;
use crate::zone::ZoneLimits;

/// Settings for zones and sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Smallest allowed zone radius in meters (inclusive).
    pub min_zone_radius_meters: f64,

    /// Largest allowed zone radius in meters (inclusive).
    pub max_zone_radius_meters: f64,

    /// Maximum number of safe zones per user.
    pub max_zones_per_user: usize,

    /// Maximum zone name length in characters.
    pub max_zone_name_len: usize,

    /// Longest sharing session a user can start, in minutes.
    pub max_sharing_minutes: u32,

    /// Precision of positions handed to sharing contacts.
    pub share_precision: LocationPrecision,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_zone_radius_meters: 50.0,
            max_zone_radius_meters: 2_000.0,
            max_zones_per_user: 20,
            max_zone_name_len: 64,
            max_sharing_minutes: 24 * 60,
            share_precision: LocationPrecision::default(),
        }
    }
}

impl SafetyConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Config`] if the JSON is malformed or the
    /// values fail [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Config`] if the file cannot be read or parsed,
    /// or the values are invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded safety config");
        Ok(config)
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the bounds are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Config`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.min_zone_radius_meters, self.max_zone_radius_meters);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 {
            return Err(SafetyError::Config(format!(
                "zone radius bounds must be positive and finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(SafetyError::Config(format!(
                "min zone radius {min} exceeds max {max}"
            )));
        }
        if self.max_zones_per_user == 0 {
            return Err(SafetyError::Config(
                "max_zones_per_user must be at least 1".to_string(),
            ));
        }
        if self.max_zone_name_len == 0 {
            return Err(SafetyError::Config(
                "max_zone_name_len must be at least 1".to_string(),
            ));
        }
        if self.max_sharing_minutes == 0 {
            return Err(SafetyError::Config(
                "max_sharing_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Zone bounds derived from this configuration.
    #[must_use]
    pub const fn zone_limits(&self) -> ZoneLimits {
        ZoneLimits {
            min_radius_meters: self.min_zone_radius_meters,
            max_radius_meters: self.max_zone_radius_meters,
            max_zones: self.max_zones_per_user,
            max_name_len: self.max_zone_name_len,
        }
    }
}
