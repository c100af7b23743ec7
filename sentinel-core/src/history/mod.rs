//! Movement and zone history.
//!
//! The log is append-only and ordered by timestamp. Appends that would go
//! backwards in time are rejected, so callers holding out-of-order data must
//! sort it first.

mod log;
pub mod types;

pub use log::{HistoryLog, HistoryRange};
pub use types::{EntryId, EntryKind, HistoryEntry, NewHistoryEntry};
