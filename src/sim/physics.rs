//! Physics collaborator seam
//!
//! The core only needs per-body position get/set, enable/disable, user data
//! (entity id and volume) and two classes of sensor "enter" events. The
//! [`PhysicsBodies`] trait is that contract; [`WellWorld`] is a small
//! kinematic implementation of it used by the headless build and the tests.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, Footprint, approx_radius};
use crate::planar_distance;

/// Opaque handle to a body owned by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Data attached to a body at spawn, returned with sensor events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyUserData {
    pub id: Option<EntityId>,
    pub volume: Option<f32>,
    pub points: u32,
}

/// What the core needs from a rigid-body simulation
pub trait PhysicsBodies {
    fn translation(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_translation(&mut self, body: BodyHandle, pos: Vec3);
    fn is_enabled(&self, body: BodyHandle) -> bool;
    fn set_enabled(&mut self, body: BodyHandle, enabled: bool);
    fn user_data(&self, body: BodyHandle) -> Option<&BodyUserData>;
}

/// Which trigger volume fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Shallow sensor across the hole opening
    Mouth,
    /// Small sensor at the centre of the well floor
    Bottom,
}

/// A body entered a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub sensor: SensorKind,
    pub body: BodyHandle,
    /// Body position when the overlap began
    pub position: Vec3,
}

/// Well and sensor proportions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellTuning {
    pub gravity: f32,
    pub well_depth: f32,
    /// Horizontal settling rate toward the well axis (1/s)
    pub well_funnel: f32,
    pub mouth_half_extent: f32,
    pub mouth_half_height: f32,
    pub bottom_half_extent: f32,
    pub bottom_half_height: f32,
    /// Height of the bottom sensor centre above the floor
    pub bottom_lift: f32,
}

impl Default for WellTuning {
    fn default() -> Self {
        Self {
            gravity: -25.0,
            well_depth: 9.0,
            well_funnel: 3.0,
            mouth_half_extent: 0.6,
            mouth_half_height: 0.35,
            bottom_half_extent: 0.28,
            bottom_half_height: 0.25,
            bottom_lift: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn intersects(&self, other: &Aabb3) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Hole geometry for one tick, built from the radius snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleGeometry {
    pub radius: f32,
    /// Same fit factor the consumption rules apply
    pub fit_factor: f32,
    pub tuning: WellTuning,
}

impl HoleGeometry {
    pub fn new(radius: f32, fit_factor: f32, tuning: WellTuning) -> Self {
        Self {
            radius,
            fit_factor,
            tuning,
        }
    }

    /// Whether a box with these half extents can pass the opening
    ///
    /// Both the footprint's half-diagonal and the volume-derived radius must
    /// fit, so anything that drops is also small enough to be armed.
    pub fn admits(&self, half: Vec3) -> bool {
        let half_diagonal = Vec2::new(half.x, half.z).length();
        let volume = 8.0 * half.x * half.y * half.z;
        half_diagonal <= self.radius && approx_radius(volume) <= self.radius * self.fit_factor
    }

    pub fn mouth_sensor(&self) -> Aabb3 {
        let t = &self.tuning;
        let half = Vec3::new(
            self.radius * t.mouth_half_extent,
            t.mouth_half_height,
            self.radius * t.mouth_half_extent,
        );
        Aabb3::from_center(Vec3::new(0.0, t.mouth_half_height, 0.0), half)
    }

    pub fn bottom_sensor(&self) -> Aabb3 {
        let t = &self.tuning;
        let half = Vec3::new(
            self.radius * t.bottom_half_extent,
            t.bottom_half_height,
            self.radius * t.bottom_half_extent,
        );
        Aabb3::from_center(Vec3::new(0.0, -t.well_depth + t.bottom_lift, 0.0), half)
    }

    /// Radius within which a resting body drops through the opening
    pub fn drop_radius(&self) -> f32 {
        self.radius * self.tuning.mouth_half_extent
    }
}

/// Motion state of a [`WellWorld`] body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyPhase {
    /// On the ground plane
    Resting,
    /// Dropping through the well
    Falling { vel_y: f32 },
    /// On the well floor
    Settled,
}

#[derive(Debug, Clone)]
struct Body {
    pos: Vec3,
    half: Vec3,
    enabled: bool,
    phase: BodyPhase,
    data: BodyUserData,
    in_mouth: bool,
    in_bottom: bool,
}

impl Body {
    /// Fully below the ground plane, i.e. held by the well walls
    fn enclosed(&self) -> bool {
        !matches!(self.phase, BodyPhase::Resting) && self.pos.y + self.half.y < 0.0
    }
}

/// Kinematic stand-in for the physics engine
///
/// Bodies rest on the ground until their centre passes over the opening and
/// the hole admits them, then fall under gravity inside the well walls and
/// settle on the floor. Sensor enter events are queued and drained by the
/// caller once per tick. When the radius changes the sensors are rebuilt, so
/// every body still overlapping one enters it again.
#[derive(Debug, Clone, Default)]
pub struct WellWorld {
    bodies: Vec<Body>,
    events: Vec<SensorEvent>,
    /// Radius used by the previous step
    last_radius: Option<f32>,
}

impl WellWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, pos: Vec3, footprint: Footprint, data: BodyUserData) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body {
            pos,
            half: footprint.half_extents(),
            enabled: true,
            phase: BodyPhase::Resting,
            data,
            in_mouth: false,
            in_bottom: false,
        });
        handle
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn phase(&self, body: BodyHandle) -> Option<BodyPhase> {
        self.bodies.get(body.0 as usize).map(|b| b.phase)
    }

    /// Advance every enabled body by `dt` and queue sensor enter events
    pub fn step(&mut self, dt: f32, hole: &HoleGeometry) {
        let t = hole.tuning;
        let mouth = hole.mouth_sensor();
        let bottom = hole.bottom_sensor();
        let floor = -t.well_depth;

        if self.last_radius.is_some_and(|r| r != hole.radius) {
            for body in &mut self.bodies {
                body.in_mouth = false;
                body.in_bottom = false;
            }
        }
        self.last_radius = Some(hole.radius);

        for (i, body) in self.bodies.iter_mut().enumerate() {
            if !body.enabled {
                continue;
            }

            match body.phase {
                BodyPhase::Resting => {
                    if hole.admits(body.half) && planar_distance(body.pos) < hole.drop_radius() {
                        body.phase = BodyPhase::Falling { vel_y: 0.0 };
                    }
                }
                BodyPhase::Falling { vel_y } => {
                    let vel_y = vel_y + t.gravity * dt;
                    body.pos.y += vel_y * dt;
                    settle_toward_axis(body, hole, dt);
                    body.phase = if body.pos.y - body.half.y <= floor {
                        body.pos.y = floor + body.half.y;
                        BodyPhase::Settled
                    } else {
                        BodyPhase::Falling { vel_y }
                    };
                }
                BodyPhase::Settled => settle_toward_axis(body, hole, dt),
            }

            let aabb = Aabb3::from_center(body.pos, body.half);
            let handle = BodyHandle(i as u32);

            let in_mouth = aabb.intersects(&mouth);
            if in_mouth && !body.in_mouth {
                self.events.push(SensorEvent {
                    sensor: SensorKind::Mouth,
                    body: handle,
                    position: body.pos,
                });
            }
            body.in_mouth = in_mouth;

            let in_bottom = aabb.intersects(&bottom);
            if in_bottom && !body.in_bottom {
                self.events.push(SensorEvent {
                    sensor: SensorKind::Bottom,
                    body: handle,
                    position: body.pos,
                });
            }
            body.in_bottom = in_bottom;
        }
    }

    /// Take all queued sensor events in the order they fired
    pub fn drain_events(&mut self) -> Vec<SensorEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Pull a body in the well toward the axis and keep it inside the walls
fn settle_toward_axis(body: &mut Body, hole: &HoleGeometry, dt: f32) {
    let keep = (1.0 - hole.tuning.well_funnel * dt).clamp(0.0, 1.0);
    let mut xz = Vec2::new(body.pos.x, body.pos.z) * keep;
    let wall = (hole.radius - body.half.x.max(body.half.z)).max(0.0);
    if xz.length() > wall {
        xz = xz.normalize_or_zero() * wall;
    }
    body.pos.x = xz.x;
    body.pos.z = xz.y;
}

impl PhysicsBodies for WellWorld {
    fn translation(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(body.0 as usize).map(|b| b.pos)
    }

    fn set_translation(&mut self, body: BodyHandle, pos: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            if !b.enabled {
                return;
            }
            // The walls hold enclosed bodies in the hole's frame
            if b.enclosed() {
                b.pos.y = pos.y;
            } else {
                b.pos = pos;
            }
        }
    }

    fn is_enabled(&self, body: BodyHandle) -> bool {
        self.bodies.get(body.0 as usize).is_some_and(|b| b.enabled)
    }

    fn set_enabled(&mut self, body: BodyHandle, enabled: bool) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            b.enabled = enabled;
        }
    }

    fn user_data(&self, body: BodyHandle) -> Option<&BodyUserData> {
        self.bodies.get(body.0 as usize).map(|b| &b.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn cube(world: &mut WellWorld, x: f32, z: f32, size: f32) -> BodyHandle {
        world.spawn(
            Vec3::new(x, size / 2.0 + 0.05, z),
            Footprint::new(size, size, size),
            BodyUserData {
                id: Some(EntityId::from("p0")),
                volume: Some(size * size * size),
                points: 1,
            },
        )
    }

    #[test]
    fn test_small_body_falls_and_triggers_both_sensors() {
        let mut world = WellWorld::new();
        let hole = HoleGeometry::new(2.0, 0.95, WellTuning::default());
        let b = cube(&mut world, 0.5, 0.0, 1.0);

        let mut events = Vec::new();
        for _ in 0..180 {
            world.step(DT, &hole);
            events.extend(world.drain_events());
        }
        assert_eq!(world.phase(b), Some(BodyPhase::Settled));
        let kinds: Vec<_> = events.iter().map(|e| e.sensor).collect();
        assert_eq!(kinds, vec![SensorKind::Mouth, SensorKind::Bottom]);
        let bottom_hit = events[1].position;
        assert!(planar_distance(bottom_hit) < 2.0 * 0.35);
    }

    #[test]
    fn test_wide_body_bridges_the_hole() {
        let mut world = WellWorld::new();
        let hole = HoleGeometry::new(1.0, 0.95, WellTuning::default());
        let b = cube(&mut world, 0.0, 0.0, 4.0);
        for _ in 0..60 {
            world.step(DT, &hole);
        }
        assert_eq!(world.phase(b), Some(BodyPhase::Resting));
        // Still touches the mouth sensor, exactly once
        let events = world.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sensor, SensorKind::Mouth);
    }

    #[test]
    fn test_far_body_is_untouched() {
        let mut world = WellWorld::new();
        let hole = HoleGeometry::new(2.0, 0.95, WellTuning::default());
        let b = cube(&mut world, 20.0, 0.0, 1.0);
        world.step(DT, &hole);
        assert_eq!(world.phase(b), Some(BodyPhase::Resting));
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_disabled_body_is_inert() {
        let mut world = WellWorld::new();
        let hole = HoleGeometry::new(2.0, 0.95, WellTuning::default());
        let b = cube(&mut world, 0.0, 0.0, 1.0);
        world.set_enabled(b, false);
        world.set_translation(b, Vec3::new(5.0, 0.0, 5.0));
        world.step(DT, &hole);
        assert!(!world.is_enabled(b));
        assert_eq!(world.phase(b), Some(BodyPhase::Resting));
        assert!(world.drain_events().is_empty());
        assert_eq!(world.translation(b).map(|p| p.x), Some(0.0));
    }

    #[test]
    fn test_enclosed_body_ignores_lateral_moves() {
        let mut world = WellWorld::new();
        let hole = HoleGeometry::new(2.0, 0.95, WellTuning::default());
        let b = cube(&mut world, 0.2, 0.0, 1.0);
        for _ in 0..120 {
            world.step(DT, &hole);
        }
        let before = world.translation(b).unwrap_or_default();
        world.set_translation(b, before + Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(world.translation(b), Some(before));
    }

    #[test]
    fn test_sensor_geometry_scales_with_radius() {
        let hole = HoleGeometry::new(2.0, 0.95, WellTuning::default());
        let mouth = hole.mouth_sensor();
        assert!((mouth.max.x - 1.2).abs() < 1e-5);
        assert!((mouth.max.y - 0.7).abs() < 1e-5);
        let bottom = hole.bottom_sensor();
        assert!((bottom.max.x - 0.56).abs() < 1e-5);
        assert!((bottom.min.y - (-9.0 + 0.2 - 0.25)).abs() < 1e-5);
    }

    fn spawn_box(world: &mut WellWorld, x: f32, z: f32, footprint: Footprint) -> BodyHandle {
        world.spawn(
            Vec3::new(x, footprint.h / 2.0 + 0.05, z),
            footprint,
            BodyUserData {
                id: Some(EntityId::from("b0")),
                volume: Some(footprint.volume()),
                points: 1,
            },
        )
    }

    #[test]
    fn test_admits_matches_the_fit_rule() {
        let hole = HoleGeometry::new(1.1, 0.95, WellTuning::default());
        assert!(hole.admits(Footprint::new(1.0, 1.0, 1.0).half_extents()));
        // Half-diagonal 1.56 does not pass a 1.1 opening
        assert!(!hole.admits(Footprint::new(2.2, 4.2, 2.2).half_extents()));
        // Thin but too much volume to be armed
        let pole = Footprint::new(0.6, 12.0, 0.6).half_extents();
        assert!(!HoleGeometry::new(0.8, 0.95, WellTuning::default()).admits(pole));
        assert!(HoleGeometry::new(1.71, 0.95, WellTuning::default()).admits(pole));
    }

    #[test]
    fn test_unfit_body_stays_on_the_ground() {
        let mut world = WellWorld::new();
        let hole = HoleGeometry::new(1.1, 0.95, WellTuning::default());
        let b = spawn_box(&mut world, 0.3, 0.0, Footprint::new(2.2, 4.2, 2.2));
        for _ in 0..120 {
            world.step(DT, &hole);
        }
        assert_eq!(world.phase(b), Some(BodyPhase::Resting));
        let events = world.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sensor, SensorKind::Mouth);
    }

    #[test]
    fn test_growth_refires_sensors_for_overlapping_bodies() {
        let mut world = WellWorld::new();
        let small = HoleGeometry::new(2.0, 0.95, WellTuning::default());
        let b = cube(&mut world, 0.3, 0.0, 1.0);
        for _ in 0..180 {
            world.step(DT, &small);
        }
        assert_eq!(world.phase(b), Some(BodyPhase::Settled));
        world.drain_events();

        // Same radius: still inside, nothing new
        world.step(DT, &small);
        assert!(world.drain_events().is_empty());

        let grown = HoleGeometry::new(2.5, 0.95, WellTuning::default());
        world.step(DT, &grown);
        let kinds: Vec<_> = world.drain_events().iter().map(|e| e.sensor).collect();
        assert_eq!(kinds, vec![SensorKind::Bottom]);

        world.step(DT, &grown);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_resting_body_drops_once_the_hole_admits_it() {
        let mut world = WellWorld::new();
        let b = spawn_box(&mut world, 0.3, 0.0, Footprint::new(2.2, 4.2, 2.2));
        world.step(DT, &HoleGeometry::new(1.1, 0.95, WellTuning::default()));
        assert_eq!(world.drain_events().len(), 1);

        let grown = HoleGeometry::new(3.0, 0.95, WellTuning::default());
        let mut kinds = Vec::new();
        for _ in 0..180 {
            world.step(DT, &grown);
            kinds.extend(world.drain_events().iter().map(|e| e.sensor));
        }
        assert_eq!(world.phase(b), Some(BodyPhase::Settled));
        assert_eq!(kinds, vec![SensorKind::Mouth, SensorKind::Bottom]);
    }
}
