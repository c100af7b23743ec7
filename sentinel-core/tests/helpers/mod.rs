//! Reusable test helpers for integration tests.
//!
//! Every harness runs against a manual clock starting at [`t0`] and a
//! recording sink, so expiry and emitted events are fully deterministic.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sentinel_core::clock::ManualClock;
use sentinel_core::events::RecordingSink;
use sentinel_core::location::Position;
use sentinel_core::{SafetyConfig, SentinelCore};

/// Connaught Place, New Delhi.
pub const DELHI: (f64, f64) = (28.6139, 77.2090);

/// Fixed start time for every harness.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// `t0()` plus `minutes`.
pub fn minutes(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

/// A validated position stamped `minutes` after `t0()`.
pub fn position_at(latitude: f64, longitude: f64, offset_minutes: i64) -> Position {
    Position::new(latitude, longitude, minutes(offset_minutes)).unwrap()
}

/// Core wired to a manual clock and a recording sink.
pub struct Harness {
    pub core: SentinelCore,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SafetyConfig::default())
    }

    pub fn with_config(config: SafetyConfig) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let sink = Arc::new(RecordingSink::new());
        let core = SentinelCore::with_config(config)
            .unwrap()
            .with_clock(clock.clone())
            .with_event_sink(sink.clone());
        Self { core, clock, sink }
    }
}
