//! Time-bounded location sharing with contacts.
//!
//! A user has at most one live [`SharingSession`]. Enabling while a session
//! is live replaces it (last write wins), and a session lapses on the first
//! query at or after its end time.

mod manager;
pub mod types;

pub use manager::SharingSessionManager;
pub use types::{
    ContactId, SessionStart, SharingSession, SharingStatus, StopReason, StoppedSession,
};
