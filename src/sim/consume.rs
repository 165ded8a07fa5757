//! Consumption state machine
//!
//! Per-entity lifecycle: `Unseen -> Armed -> Eaten`. An entity is armed when
//! it crosses the mouth sensor while small enough to fit, and eaten only when
//! an armed entity reaches the bottom sensor close to the hole's axis.
//! Everything else is a silent no-op, counted in [`ConsumptionStats`].

use std::collections::BTreeSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, approx_radius};
use crate::planar_distance;

/// Guards and scoring for consumption
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionRules {
    /// Object radius must be at most `hole_radius * fit_factor`
    pub fit_factor: f32,
    /// Bottom hit must land within `hole_radius * center_factor` of the axis
    pub center_factor: f32,
    pub score_coefficient: f32,
    pub score_rule: ScoreRule,
}

impl Default for ConsumptionRules {
    fn default() -> Self {
        Self {
            fit_factor: 0.95,
            center_factor: 0.35,
            score_coefficient: 25.0,
            score_rule: ScoreRule::Volume,
        }
    }
}

impl ConsumptionRules {
    pub fn fits(&self, volume: f32, hole_radius: f32) -> bool {
        approx_radius(volume) <= hole_radius * self.fit_factor
    }

    /// Score for eating an entity of `volume` worth `points`
    pub fn score_for(&self, volume: f32, points: u32) -> u64 {
        match self.score_rule {
            ScoreRule::Volume => (volume * self.score_coefficient).round().max(1.0) as u64,
            ScoreRule::Points => u64::from(points.max(1)),
        }
    }
}

/// How a successful consumption is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoreRule {
    /// `max(1, round(volume * score_coefficient))`
    #[default]
    Volume,
    /// The entity's point value
    Points,
}

/// What a sensor delivered about the body that entered it
///
/// `id` and `volume` come from collaborator user data and may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorContact {
    pub id: Option<EntityId>,
    pub volume: Option<f32>,
    pub points: u32,
    /// Body position at the moment of contact
    pub position: Vec3,
}

/// Why an event had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// Missing id or non-finite volume
    Malformed,
    AlreadyEaten,
    /// Bottom hit without a prior mouth arm
    NotArmed,
    TooLarge,
    OffCenter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MouthOutcome {
    Armed(EntityId),
    /// Already armed; no change
    StillArmed,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BottomOutcome {
    Eaten {
        id: EntityId,
        volume: f32,
        score: u64,
    },
    Rejected(Rejection),
}

/// Debug counters for rejected and accepted events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumptionStats {
    pub armed: u32,
    pub eaten: u32,
    pub malformed: u32,
    pub already_eaten: u32,
    pub not_armed: u32,
    pub too_large: u32,
    pub off_center: u32,
}

impl ConsumptionStats {
    fn count(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Malformed => self.malformed += 1,
            Rejection::AlreadyEaten => self.already_eaten += 1,
            Rejection::NotArmed => self.not_armed += 1,
            Rejection::TooLarge => self.too_large += 1,
            Rejection::OffCenter => self.off_center += 1,
        }
    }
}

/// Owns the armed and eaten sets
#[derive(Debug, Clone, Default)]
pub struct ConsumptionTracker {
    rules: ConsumptionRules,
    armed: BTreeSet<EntityId>,
    eaten: BTreeSet<EntityId>,
    stats: ConsumptionStats,
}

impl ConsumptionTracker {
    pub fn new(rules: ConsumptionRules) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn rules(&self) -> &ConsumptionRules {
        &self.rules
    }

    pub fn is_armed(&self, id: &EntityId) -> bool {
        self.armed.contains(id)
    }

    pub fn is_eaten(&self, id: &EntityId) -> bool {
        self.eaten.contains(id)
    }

    pub fn eaten_count(&self) -> usize {
        self.eaten.len()
    }

    pub fn stats(&self) -> ConsumptionStats {
        self.stats
    }

    /// Mouth sensor entered: arm the entity if it fits
    pub fn on_mouth_enter(&mut self, contact: &SensorContact, hole_radius: f32) -> MouthOutcome {
        let (id, volume) = match valid(contact) {
            Ok(v) => v,
            Err(r) => return self.reject_mouth(r),
        };
        if self.eaten.contains(id) {
            return self.reject_mouth(Rejection::AlreadyEaten);
        }
        if !self.rules.fits(volume, hole_radius) {
            return self.reject_mouth(Rejection::TooLarge);
        }
        if !self.armed.insert(id.clone()) {
            return MouthOutcome::StillArmed;
        }
        self.stats.armed += 1;
        MouthOutcome::Armed(id.clone())
    }

    /// Bottom sensor entered: eat the entity if every guard passes
    pub fn on_bottom_enter(&mut self, contact: &SensorContact, hole_radius: f32) -> BottomOutcome {
        let (id, volume) = match valid(contact) {
            Ok(v) => v,
            Err(r) => return self.reject_bottom(r),
        };
        if self.eaten.contains(id) {
            return self.reject_bottom(Rejection::AlreadyEaten);
        }
        if !self.armed.contains(id) {
            return self.reject_bottom(Rejection::NotArmed);
        }
        if planar_distance(contact.position) > hole_radius * self.rules.center_factor {
            return self.reject_bottom(Rejection::OffCenter);
        }
        // The hole may have grown (never shrunk) since arming; re-check anyway
        if !self.rules.fits(volume, hole_radius) {
            return self.reject_bottom(Rejection::TooLarge);
        }

        self.armed.remove(id);
        self.eaten.insert(id.clone());
        self.stats.eaten += 1;
        BottomOutcome::Eaten {
            id: id.clone(),
            volume,
            score: self.rules.score_for(volume, contact.points),
        }
    }

    fn reject_mouth(&mut self, r: Rejection) -> MouthOutcome {
        self.stats.count(r);
        log::debug!("mouth event ignored: {r:?}");
        MouthOutcome::Rejected(r)
    }

    fn reject_bottom(&mut self, r: Rejection) -> BottomOutcome {
        self.stats.count(r);
        log::debug!("bottom event ignored: {r:?}");
        BottomOutcome::Rejected(r)
    }
}

fn valid(contact: &SensorContact) -> Result<(&EntityId, f32), Rejection> {
    match (&contact.id, contact.volume) {
        (Some(id), Some(v)) if v.is_finite() && !id.as_str().is_empty() => Ok((id, v)),
        _ => Err(Rejection::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, volume: f32, x: f32, z: f32) -> SensorContact {
        SensorContact {
            id: Some(EntityId::from(id)),
            volume: Some(volume),
            points: 10,
            position: Vec3::new(x, -8.5, z),
        }
    }

    #[test]
    fn test_arm_then_eat_scores_volume() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        let c = contact("p1", 1.0, 0.3, 0.0);
        assert_eq!(t.on_mouth_enter(&c, 2.0), MouthOutcome::Armed("p1".into()));
        let out = t.on_bottom_enter(&c, 2.0);
        assert_eq!(
            out,
            BottomOutcome::Eaten {
                id: "p1".into(),
                volume: 1.0,
                score: 25
            }
        );
        assert!(t.is_eaten(&"p1".into()));
        assert!(!t.is_armed(&"p1".into()));
    }

    #[test]
    fn test_off_center_bottom_stays_armed() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        t.on_mouth_enter(&contact("p1", 1.0, 0.0, 0.0), 2.0);
        let out = t.on_bottom_enter(&contact("p1", 1.0, 1.0, 0.0), 2.0);
        assert_eq!(out, BottomOutcome::Rejected(Rejection::OffCenter));
        assert!(t.is_armed(&"p1".into()));
        assert!(!t.is_eaten(&"p1".into()));
        assert_eq!(t.stats().off_center, 1);
    }

    #[test]
    fn test_bottom_without_arm_ignored() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        let out = t.on_bottom_enter(&contact("p9", 1.0, 0.0, 0.0), 2.0);
        assert_eq!(out, BottomOutcome::Rejected(Rejection::NotArmed));
        assert_eq!(t.eaten_count(), 0);
        assert_eq!(t.stats().not_armed, 1);
    }

    #[test]
    fn test_eating_is_idempotent() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        let c = contact("p1", 1.0, 0.0, 0.0);
        t.on_mouth_enter(&c, 2.0);
        assert!(matches!(t.on_bottom_enter(&c, 2.0), BottomOutcome::Eaten { .. }));
        assert_eq!(
            t.on_bottom_enter(&c, 2.0),
            BottomOutcome::Rejected(Rejection::AlreadyEaten)
        );
        assert_eq!(
            t.on_mouth_enter(&c, 2.0),
            MouthOutcome::Rejected(Rejection::AlreadyEaten)
        );
        assert_eq!(t.stats().eaten, 1);
    }

    #[test]
    fn test_too_large_never_arms() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        // cbrt(27) * 0.5 = 1.5 > 1.5 * 0.95
        let c = contact("b1", 27.0, 0.0, 0.0);
        assert_eq!(t.on_mouth_enter(&c, 1.5), MouthOutcome::Rejected(Rejection::TooLarge));
        assert_eq!(t.on_bottom_enter(&c, 1.5), BottomOutcome::Rejected(Rejection::NotArmed));
        assert_eq!(t.on_mouth_enter(&c, 1.5), MouthOutcome::Rejected(Rejection::TooLarge));
        assert!(!t.is_armed(&"b1".into()));
    }

    #[test]
    fn test_rearm_is_noop() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        let c = contact("p1", 1.0, 0.0, 0.0);
        t.on_mouth_enter(&c, 2.0);
        assert_eq!(t.on_mouth_enter(&c, 2.0), MouthOutcome::StillArmed);
        assert_eq!(t.stats().armed, 1);
    }

    #[test]
    fn test_malformed_contacts_ignored() {
        let mut t = ConsumptionTracker::new(ConsumptionRules::default());
        let mut c = contact("p1", 1.0, 0.0, 0.0);
        c.id = None;
        assert_eq!(t.on_mouth_enter(&c, 2.0), MouthOutcome::Rejected(Rejection::Malformed));
        let mut c = contact("p1", 1.0, 0.0, 0.0);
        c.volume = Some(f32::NAN);
        assert_eq!(t.on_bottom_enter(&c, 2.0), BottomOutcome::Rejected(Rejection::Malformed));
        assert_eq!(t.stats().malformed, 2);
        assert!(!t.is_armed(&"p1".into()));
    }

    #[test]
    fn test_score_rules() {
        let rules = ConsumptionRules::default();
        assert_eq!(rules.score_for(0.01, 7), 1);
        assert_eq!(rules.score_for(2.0, 7), 50);
        let points = ConsumptionRules {
            score_rule: ScoreRule::Points,
            ..rules
        };
        assert_eq!(points.score_for(2.0, 7), 7);
    }
}
