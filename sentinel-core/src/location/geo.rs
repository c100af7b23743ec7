//! Great-circle distance on a spherical Earth.

use super::types::Position;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance in meters between two latitude/longitude pairs (degrees).
///
/// # Examples
///
/// ```
/// use sentinel_core::location::geo::haversine_meters;
///
/// // One degree of latitude is roughly 111.2 km.
/// let d = haversine_meters(0.0, 0.0, 1.0, 0.0);
/// assert!((d - 111_195.0).abs() < 10.0);
/// ```
#[must_use]
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Haversine distance in meters between two positions. Timestamps are ignored.
#[must_use]
pub fn haversine_distance(a: &Position, b: &Position) -> f64 {
    haversine_meters(a.latitude(), a.longitude(), b.latitude(), b.longitude())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_meters(28.6139, 77.2090, 28.6139, 77.2090), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_meters(28.6139, 77.2090, 19.0760, 72.8777);
        let ba = haversine_meters(19.0760, 72.8777, 28.6139, 77.2090);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn delhi_to_mumbai_is_about_1150_km() {
        let d = haversine_meters(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((1_140_000.0..1_160_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = haversine_meters(0.0, 0.0, 0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - half).abs() < 1.0);
    }

    #[test]
    fn crossing_the_dateline_takes_the_short_way() {
        let d = haversine_meters(0.0, 179.9, 0.0, -179.9);
        assert!(d < 25_000.0, "got {d}");
    }

    #[test]
    fn positions_use_coordinates_only() {
        let a = Position::new(51.5007, -0.1246, Utc::now()).unwrap();
        let b = Position::new(51.5007, -0.1246, Utc::now()).unwrap();
        assert_eq!(haversine_distance(&a, &b), 0.0);
    }
}
