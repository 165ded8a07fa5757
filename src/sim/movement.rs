//! Movement and wrap controller
//!
//! The hole never moves. Player input instead pushes the world the opposite
//! way: every live body is displaced by `-direction * speed * dt` and wrapped
//! toroidally into the level's arena. Decoration (ground tiles) follows a
//! separate visual offset that wraps on the tile size.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::consume::ConsumptionTracker;
use super::entity::EntityId;
use super::physics::{BodyHandle, PhysicsBodies};
use crate::wrap_coord;

/// Directional input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {
    /// Build from currently held key names (WASD or arrows, any case)
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut input = Self::default();
        for key in keys {
            match key.to_ascii_lowercase().as_str() {
                "w" | "arrowup" => input.up = true,
                "s" | "arrowdown" => input.down = true,
                "a" | "arrowleft" => input.left = true,
                "d" | "arrowright" => input.right = true,
                _ => {}
            }
        }
        input
    }

    /// Unit direction on the XZ plane (zero when idle or cancelled out)
    ///
    /// "Up" points into the screen, which is -Z with the default camera.
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    pub fn is_idle(&self) -> bool {
        self.direction() == Vec2::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// World units per second
    pub speed: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self { speed: 10.5 }
    }
}

/// Owns the entity-to-body map and the visual world offset
#[derive(Debug, Clone, Default)]
pub struct MovementController {
    tuning: MovementTuning,
    wrap_half_extent: f32,
    tile_size: f32,
    world_offset: Vec2,
    bodies: BTreeMap<EntityId, BodyHandle>,
}

impl MovementController {
    pub fn new(tuning: MovementTuning, wrap_half_extent: f32, tile_size: f32) -> Self {
        Self {
            tuning,
            wrap_half_extent,
            tile_size,
            ..Default::default()
        }
    }

    pub fn register(&mut self, id: EntityId, body: BodyHandle) {
        self.bodies.insert(id, body);
    }

    pub fn body(&self, id: &EntityId) -> Option<BodyHandle> {
        self.bodies.get(id).copied()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (&EntityId, BodyHandle)> {
        self.bodies.iter().map(|(id, h)| (id, *h))
    }

    pub fn wrap_half_extent(&self) -> f32 {
        self.wrap_half_extent
    }

    /// Accumulated inverse displacement since the level started
    pub fn world_offset(&self) -> Vec2 {
        self.world_offset
    }

    /// World offset wrapped into one tile, for seamless repeating ground
    pub fn ground_offset(&self) -> Vec2 {
        if self.tile_size <= 0.0 {
            return self.world_offset;
        }
        let half = self.tile_size * 0.5;
        Vec2::new(
            wrap_coord(self.world_offset.x, half),
            wrap_coord(self.world_offset.y, half),
        )
    }

    /// Push the world opposite to `input` for one tick
    ///
    /// Eaten entities and disabled bodies are left where they are. Returns the
    /// planar displacement applied.
    pub fn step(
        &mut self,
        input: &MoveInput,
        dt: f32,
        physics: &mut impl PhysicsBodies,
        tracker: &ConsumptionTracker,
    ) -> Vec2 {
        let dir = input.direction();
        if dir == Vec2::ZERO || dt <= 0.0 {
            return Vec2::ZERO;
        }
        let delta = -dir * self.tuning.speed * dt;
        let half = self.wrap_half_extent;

        for (id, &body) in &self.bodies {
            if tracker.is_eaten(id) || !physics.is_enabled(body) {
                continue;
            }
            let Some(pos) = physics.translation(body) else {
                continue;
            };
            let moved = Vec3::new(
                wrap_coord(pos.x + delta.x, half),
                pos.y,
                wrap_coord(pos.z + delta.y, half),
            );
            physics.set_translation(body, moved);
        }

        self.world_offset += delta;
        // Keep the accumulator bounded; only its value modulo the tile matters
        if self.tile_size > 0.0 {
            let period = self.tile_size * 64.0;
            self.world_offset.x = wrap_coord(self.world_offset.x, period);
            self.world_offset.y = wrap_coord(self.world_offset.y, period);
        }
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub offset: [f32; 3],
    /// Fraction of the remaining distance closed per tick
    pub smoothing: f32,
    pub fov_degrees: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: [14.0, 18.0, 22.0],
            smoothing: 0.08,
            fov_degrees: 55.0,
        }
    }
}

/// Smoothed chase camera that always looks at the hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    tuning: CameraTuning,
}

impl CameraRig {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            position: Vec3::from_array(tuning.offset),
            target: Vec3::ZERO,
            fov_degrees: tuning.fov_degrees,
            tuning,
        }
    }

    pub fn follow(&mut self) {
        let goal = Vec3::from_array(self.tuning.offset);
        self.position = self.position.lerp(goal, self.tuning.smoothing.clamp(0.0, 1.0));
        self.target = Vec3::ZERO;
    }

    /// Unit vector from the camera toward what it looks at
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}
