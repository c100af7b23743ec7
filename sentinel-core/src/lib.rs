//! Sentinel Core Library
//!
//! Location safety core for Sentinel: safe-zone geofencing, time-bounded
//! location sharing with contacts, and an ordered movement history.
//!
//! The crate is a library boundary. Geolocation sources push readings in,
//! and notification delivery happens outside through an [`EventSink`].

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod location;
pub mod sharing;
pub mod zone;

pub use api::{SentinelCore, UserId};
pub use config::SafetyConfig;
pub use error::{Result, SafetyError};
pub use events::{CoreEvent, EventSink, NoopSink};
