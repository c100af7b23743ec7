//! Append-only, time-ordered history log.

use std::slice;

use chrono::{DateTime, Utc};

use super::types::{EntryId, HistoryEntry, NewHistoryEntry};
use crate::error::{Result, SafetyError};

/// One user's movement and zone history.
///
/// Entries are kept sorted by timestamp simply by refusing any append that
/// would go backwards; range queries are then two binary searches.
///
/// The ordering watermark is the newest timestamp ever accepted. Pruning
/// removes entries but never moves the watermark back.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    last_accepted: Option<DateTime<Utc>>,
    next_id: u64,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_accepted: None,
            next_id: 1,
        }
    }

    /// Appends an entry and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidEntry`] if the entry's timestamp precedes
    /// the last accepted timestamp. Equal timestamps are accepted.
    pub fn append(&mut self, entry: NewHistoryEntry) -> Result<EntryId> {
        let timestamp = entry.timestamp();
        if let Some(last) = self.last_accepted {
            if timestamp < last {
                return Err(SafetyError::InvalidEntry(format!(
                    "timestamp {timestamp} precedes last accepted entry at {last}"
                )));
            }
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.last_accepted = Some(timestamp);

        self.entries.push(HistoryEntry {
            id,
            kind: entry.kind,
            position: entry.position,
            timestamp,
            description: entry.description,
        });
        Ok(id)
    }

    /// Whether an entry stamped `timestamp` would be accepted.
    #[must_use]
    pub fn accepts(&self, timestamp: DateTime<Utc>) -> bool {
        self.last_accepted.is_none_or(|last| timestamp >= last)
    }

    /// Timestamp of the newest entry ever accepted, even if since pruned.
    #[must_use]
    pub const fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_accepted
    }

    /// Entries with `since <= timestamp <= until`, oldest first.
    ///
    /// The returned iterator borrows the log and can be cloned to restart.
    /// An inverted range yields nothing.
    #[must_use]
    pub fn query(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> HistoryRange<'_> {
        let start = self.entries.partition_point(|entry| entry.timestamp < since);
        let end = self
            .entries
            .partition_point(|entry| entry.timestamp <= until)
            .max(start);
        HistoryRange {
            inner: self.entries[start..end].iter(),
        }
    }

    /// Drops every entry older than `cutoff` and returns how many were removed.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let count = self.entries.partition_point(|entry| entry.timestamp < cutoff);
        self.entries.drain(..count);
        count
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> HistoryRange<'_> {
        HistoryRange {
            inner: self.entries.iter(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lazy, restartable view over a slice of the log.
#[derive(Debug, Clone)]
pub struct HistoryRange<'a> {
    inner: slice::Iter<'a, HistoryEntry>,
}

impl<'a> Iterator for HistoryRange<'a> {
    type Item = &'a HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for HistoryRange<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for HistoryRange<'_> {}
