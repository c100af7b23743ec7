//! Coordinate obfuscation and geohash encoding for shared locations.
//!
//! Positions handed to sharing contacts pass through these functions so the
//! precision leaving the core is bounded by configuration, not by the sensor.

use super::types::LocationPrecision;

/// Obfuscates a coordinate to a specified precision by reducing decimal places.
///
/// # Examples
///
/// ```
/// use sentinel_core::location::{obfuscate_coordinate, LocationPrecision};
///
/// let obfuscated = obfuscate_coordinate(28.613_945, LocationPrecision::Standard);
/// assert_eq!(obfuscated, 28.6139);
/// ```
#[must_use]
pub fn obfuscate_coordinate(coord: f64, precision: LocationPrecision) -> f64 {
    if !coord.is_finite() {
        return 0.0;
    }

    let multiplier = 10_f64.powi(precision.decimal_places());
    (coord * multiplier).round() / multiplier
}

/// Converts latitude/longitude to a geohash string of `precision` characters.
///
/// Returns an empty string if the coordinates cannot be encoded (NaN,
/// infinite, or out of range). Callers holding a validated
/// [`Position`](super::Position) never hit that case.
///
/// # Examples
///
/// ```
/// use sentinel_core::location::location_to_geohash;
///
/// let geohash = location_to_geohash(37.7749, -122.4194, 8);
/// assert_eq!(geohash.len(), 8);
/// ```
#[must_use]
pub fn location_to_geohash(lat: f64, lon: f64, precision: u8) -> String {
    geohash::encode(geohash::Coord { x: lon, y: lat }, precision as usize)
        .unwrap_or_else(|_| String::new())
}

/// Decodes a geohash to the (latitude, longitude) of its cell center.
///
/// Returns `None` for empty or malformed input.
#[must_use]
pub fn geohash_to_location(geohash: &str) -> Option<(f64, f64)> {
    if geohash.is_empty() {
        return None;
    }
    geohash::decode(geohash)
        .ok()
        .map(|(coord, _, _)| (coord.y, coord.x))
}
