//! Validation and normalization of incoming position fixes.
//!
//! Samples that arrive out of order for a source are dropped rather than
//! reordered. Ingest never touches history; it only hands back a [`Position`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::types::{Position, RawPosition, SourceId};
use crate::error::{Result, SafetyError};

/// Per-user ingest state: the last accepted timestamp for each source.
#[derive(Debug, Default, Clone)]
pub struct GeoSampleIngest {
    last_accepted: HashMap<SourceId, DateTime<Utc>>,
}

impl GeoSampleIngest {
    /// Creates an ingest stage with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a raw reading and returns the normalized position.
    ///
    /// A sample with the same timestamp as the last accepted one is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidSample`] if coordinates are out of range
    /// or not finite, if the accuracy is negative or not finite, or if the
    /// timestamp is older than the last accepted sample from the same source.
    pub fn ingest(&mut self, raw: &RawPosition) -> Result<Position> {
        if let Some(accuracy) = raw.accuracy_meters {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(SafetyError::InvalidSample(format!(
                    "accuracy {accuracy} must be a non-negative number of meters"
                )));
            }
        }

        if let Some(last) = self.last_accepted.get(&raw.source) {
            if raw.timestamp < *last {
                return Err(SafetyError::InvalidSample(format!(
                    "stale sample from {}: {} is older than {}",
                    raw.source, raw.timestamp, last
                )));
            }
        }

        let position = Position::new(raw.latitude, raw.longitude, raw.timestamp)?;
        self.last_accepted.insert(raw.source.clone(), raw.timestamp);
        Ok(position)
    }

    /// Last accepted timestamp for `source`, if any.
    #[must_use]
    pub fn last_accepted(&self, source: &SourceId) -> Option<DateTime<Utc>> {
        self.last_accepted.get(source).copied()
    }
}
