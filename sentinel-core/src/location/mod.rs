//! Location module for Sentinel.
//!
//! Provides the position pipeline that feeds safe-zone evaluation:
//! - Validation of raw fixes from one or more geolocation sources
//! - Stale-sample dropping per source (no reordering)
//! - Haversine distance for geofence checks
//! - Coordinate obfuscation and geohash encoding for positions shared with contacts
//!
//! # Example Usage
//!
//! ```
//! use chrono::Utc;
//! use sentinel_core::location::{GeoSampleIngest, RawPosition};
//!
//! let mut ingest = GeoSampleIngest::new();
//! let raw = RawPosition::new("gps", 28.6139, 77.2090, Utc::now());
//! let position = ingest.ingest(&raw).unwrap();
//! assert_eq!(position.latitude(), 28.6139);
//! ```

pub mod geo;
mod ingest;
pub mod privacy;
pub mod types;

pub use ingest::GeoSampleIngest;
pub use privacy::{geohash_to_location, location_to_geohash, obfuscate_coordinate};
pub use types::{LocationPrecision, Position, RawPosition, SharedLocation, SourceId};
