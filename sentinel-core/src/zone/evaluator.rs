//! Safe zone set and geofence transition detection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::types::{
    NewZone, SafeZone, TransitionKind, ZoneId, ZoneLimits, ZoneMembership, ZoneTransition,
    ZoneUpdate,
};
use crate::error::{Result, SafetyError};
use crate::location::Position;

/// Holds one user's zones and the last recorded membership for each.
///
/// A zone with no recorded membership is treated as "outside", so the first
/// fix inside a freshly created zone reports an enter.
#[derive(Debug, Clone)]
pub struct SafeZoneEvaluator {
    limits: ZoneLimits,
    zones: BTreeMap<ZoneId, SafeZone>,
    inside: BTreeMap<ZoneId, bool>,
    next_id: u64,
}

impl Default for SafeZoneEvaluator {
    fn default() -> Self {
        Self::new(ZoneLimits::default())
    }
}

impl SafeZoneEvaluator {
    /// Creates an empty zone set governed by `limits`.
    #[must_use]
    pub const fn new(limits: ZoneLimits) -> Self {
        Self {
            limits,
            zones: BTreeMap::new(),
            inside: BTreeMap::new(),
            next_id: 1,
        }
    }

    // ==================== Zone Operations ====================

    /// Creates a zone and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidRequest`] if the name or radius fails
    /// validation or the zone limit has been reached.
    pub fn create_zone(&mut self, zone: NewZone, now: DateTime<Utc>) -> Result<SafeZone> {
        if self.zones.len() >= self.limits.max_zones {
            return Err(SafetyError::InvalidRequest(format!(
                "zone limit of {} reached",
                self.limits.max_zones
            )));
        }
        let name = self.limits.check_name(&zone.name)?;
        self.limits.check_radius(zone.radius_meters)?;

        let id = ZoneId(self.next_id);
        self.next_id += 1;

        let zone = SafeZone {
            id,
            name,
            center: zone.center,
            radius_meters: zone.radius_meters,
            kind: zone.kind,
            created_at: now,
            updated_at: now,
        };
        self.zones.insert(id, zone.clone());
        Ok(zone)
    }

    /// Applies a partial update to an existing zone.
    ///
    /// Recorded membership is kept; the next evaluation compares against it.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::NotFound`] for an unknown id, or
    /// [`SafetyError::InvalidRequest`] if a new name or radius is invalid.
    /// Nothing is changed on error.
    pub fn update_zone(
        &mut self,
        id: ZoneId,
        update: ZoneUpdate,
        now: DateTime<Utc>,
    ) -> Result<SafeZone> {
        let name = update
            .name
            .as_deref()
            .map(|name| self.limits.check_name(name))
            .transpose()?;
        if let Some(radius) = update.radius_meters {
            self.limits.check_radius(radius)?;
        }

        let zone = self
            .zones
            .get_mut(&id)
            .ok_or_else(|| SafetyError::NotFound(id.to_string()))?;

        if let Some(name) = name {
            zone.name = name;
        }
        if let Some(center) = update.center {
            zone.center = center;
        }
        if let Some(radius) = update.radius_meters {
            zone.radius_meters = radius;
        }
        if let Some(kind) = update.kind {
            zone.kind = kind;
        }
        zone.updated_at = now;

        Ok(zone.clone())
    }

    /// Deletes a zone and forgets its membership. No exit is reported.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::NotFound`] for an unknown id.
    pub fn delete_zone(&mut self, id: ZoneId) -> Result<SafeZone> {
        let zone = self
            .zones
            .remove(&id)
            .ok_or_else(|| SafetyError::NotFound(id.to_string()))?;
        self.inside.remove(&id);
        Ok(zone)
    }

    /// Looks up a zone by id.
    #[must_use]
    pub fn get(&self, id: ZoneId) -> Option<&SafeZone> {
        self.zones.get(&id)
    }

    /// All zones, ordered by id.
    pub fn zones(&self) -> impl Iterator<Item = &SafeZone> {
        self.zones.values()
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether there are no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Last recorded membership for a zone, if it has been evaluated.
    #[must_use]
    pub fn recorded_membership(&self, id: ZoneId) -> Option<bool> {
        self.inside.get(&id).copied()
    }

    // ==================== Evaluation ====================

    /// Computes membership of `position` in every zone without recording it.
    #[must_use]
    pub fn membership(&self, position: &Position) -> Vec<ZoneMembership> {
        self.zones
            .values()
            .map(|zone| zone.membership(position))
            .collect()
    }

    /// Transitions `position` would cause against the recorded membership,
    /// ordered by zone id. Nothing is recorded.
    #[must_use]
    pub fn transitions(&self, position: &Position) -> Vec<ZoneTransition> {
        self.zones
            .values()
            .filter_map(|zone| {
                let membership = zone.membership(position);
                let was_inside = self.recorded_membership(zone.id).unwrap_or(false);
                if membership.inside == was_inside {
                    return None;
                }
                Some(ZoneTransition {
                    zone_id: zone.id,
                    zone_name: zone.name.clone(),
                    kind: if membership.inside {
                        TransitionKind::Enter
                    } else {
                        TransitionKind::Exit
                    },
                    position: *position,
                    distance_meters: membership.distance_meters,
                })
            })
            .collect()
    }

    /// Records the flips returned by [`transitions`](Self::transitions) for
    /// the same position.
    ///
    /// Zones without a flip keep their recorded state; a zone that was never
    /// evaluated and did not flip is recorded as outside.
    pub fn apply(&mut self, transitions: &[ZoneTransition]) {
        for transition in transitions {
            if self.zones.contains_key(&transition.zone_id) {
                self.inside
                    .insert(transition.zone_id, transition.kind == TransitionKind::Enter);
            }
        }
        for id in self.zones.keys() {
            self.inside.entry(*id).or_insert(false);
        }
    }

    /// Evaluates `position` against every zone and records the result.
    ///
    /// Returns one transition per zone whose membership flipped, ordered by
    /// zone id. Repeating the same position yields no transitions. An empty
    /// zone set yields an empty list.
    pub fn evaluate(&mut self, position: &Position) -> Vec<ZoneTransition> {
        let transitions = self.transitions(position);
        self.apply(&transitions);
        transitions
    }
}
