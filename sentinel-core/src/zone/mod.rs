//! Safe zones and geofence evaluation.
//!
//! Each user owns a set of circular [`SafeZone`]s. Positions are checked
//! against every zone with haversine distance, and a [`ZoneTransition`] is
//! produced only when membership in a zone flips.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use sentinel_core::location::Position;
//! use sentinel_core::zone::{NewZone, SafeZoneEvaluator, TransitionKind, ZoneKind};
//!
//! let now = Utc::now();
//! let center = Position::new(28.6139, 77.2090, now).unwrap();
//!
//! let mut zones = SafeZoneEvaluator::default();
//! zones
//!     .create_zone(NewZone::new("Home", center, 500.0, ZoneKind::Home), now)
//!     .unwrap();
//!
//! let transitions = zones.evaluate(&center);
//! assert_eq!(transitions[0].kind, TransitionKind::Enter);
//! assert!(zones.evaluate(&center).is_empty());
//! ```

mod evaluator;
pub mod types;

pub use evaluator::SafeZoneEvaluator;
pub use types::{
    NewZone, SafeZone, TransitionKind, ZoneId, ZoneKind, ZoneLimits, ZoneMembership,
    ZoneTransition, ZoneUpdate,
};
