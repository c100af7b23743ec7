//! History entry types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Position;
use crate::zone::{TransitionKind, ZoneTransition};

/// Identifier of a history entry, assigned by the log in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A plain movement fix.
    Movement,
    /// Entered a safe zone.
    ZoneEnter,
    /// Left a safe zone.
    ZoneExit,
}

impl EntryKind {
    /// Converts to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::ZoneEnter => "zone-enter",
            Self::ZoneExit => "zone-exit",
        }
    }
}

impl From<TransitionKind> for EntryKind {
    fn from(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Enter => Self::ZoneEnter,
            TransitionKind::Exit => Self::ZoneExit,
        }
    }
}

/// A recorded entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Assigned id.
    pub id: EntryId,
    /// What happened.
    pub kind: EntryKind,
    /// Where it happened.
    pub position: Position,
    /// When it happened; the log is ordered by this field.
    pub timestamp: DateTime<Utc>,
    /// Human-readable summary for the history panel.
    pub description: String,
}

/// An entry waiting to be appended. It is stamped with its position's time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    /// What happened.
    pub kind: EntryKind,
    /// Where and when it happened.
    pub position: Position,
    /// Human-readable summary.
    pub description: String,
}

impl NewHistoryEntry {
    /// A movement entry stamped with the position's own timestamp.
    #[must_use]
    pub fn movement(position: Position, description: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Movement,
            position,
            description: description.into(),
        }
    }

    /// A zone-enter or zone-exit entry for a transition.
    #[must_use]
    pub fn from_transition(transition: &ZoneTransition) -> Self {
        Self {
            kind: transition.kind.into(),
            position: transition.position,
            description: transition.describe(),
        }
    }

    /// When it happened; the log orders entries by this.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.position.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneId;

    #[test]
    fn entry_kind_strings() {
        assert_eq!(EntryKind::Movement.as_str(), "movement");
        assert_eq!(EntryKind::ZoneEnter.as_str(), "zone-enter");
        assert_eq!(EntryKind::ZoneExit.as_str(), "zone-exit");
    }

    #[test]
    fn movement_uses_position_timestamp() {
        let position = Position::new(1.0, 2.0, Utc::now()).unwrap();
        let entry = NewHistoryEntry::movement(position, "Walked to the park");

        assert_eq!(entry.kind, EntryKind::Movement);
        assert_eq!(entry.timestamp(), position.timestamp());
    }

    #[test]
    fn from_transition_maps_kind_and_description() {
        let position = Position::new(1.0, 2.0, Utc::now()).unwrap();
        let transition = ZoneTransition {
            zone_id: ZoneId(4),
            zone_name: "School".to_string(),
            kind: TransitionKind::Exit,
            position,
            distance_meters: 812.0,
        };

        let entry = NewHistoryEntry::from_transition(&transition);

        assert_eq!(entry.kind, EntryKind::ZoneExit);
        assert_eq!(entry.description, "Left School");
        assert_eq!(entry.timestamp(), position.timestamp());
    }

    #[test]
    fn moving_the_position_moves_the_timestamp() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::minutes(5);
        let mut entry =
            NewHistoryEntry::movement(Position::new(1.0, 2.0, earlier).unwrap(), "fix");

        entry.position = entry.position.at(later);

        assert_eq!(entry.timestamp(), later);
    }
}
