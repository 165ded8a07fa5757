//! Placeable world entities (buildings and props)

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable, unique entity identifier (e.g. `b17`, `p203`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(prefix: &str, index: u32) -> Self {
        Self(format!("{prefix}{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Axis-aligned box size in world units (width along X, height along Y, depth along Z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub w: f32,
    pub h: f32,
    pub d: f32,
}

impl Footprint {
    pub const fn new(w: f32, h: f32, d: f32) -> Self {
        Self { w, h, d }
    }

    pub fn volume(&self) -> f32 {
        self.w * self.h * self.d
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.w, self.h, self.d) * 0.5
    }

    /// Larger of the two horizontal half-extents
    pub fn max_half_xz(&self) -> f32 {
        self.w.max(self.d) * 0.5
    }

    pub fn scaled(&self, s: f32) -> Self {
        Self::new(self.w * s, self.h * s, self.d * s)
    }
}

/// Entity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Building,
    Prop,
}

impl EntityKind {
    /// Id prefix for generated entities of this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Building => "b",
            EntityKind::Prop => "p",
        }
    }
}

/// A generated building or prop
///
/// Immutable after generation. Eaten state is tracked by the consumption
/// state machine, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Spawn position (box centre)
    pub position: Vec3,
    pub footprint: Footprint,
    pub volume: f32,
    pub mass: f32,
    /// Rotation about the vertical axis (radians)
    pub yaw: f32,
    /// Visual asset reference (opaque to the core)
    pub model: String,
    pub points: u32,
}

/// Approximate radius of an object from its volume (cube assumption)
#[inline]
pub fn approx_radius(volume: f32) -> f32 {
    volume.max(1e-4).cbrt() * 0.5
}

/// Mass from volume, clamped to the stable range of the physics collaborator
#[inline]
pub fn mass_for_volume(volume: f32, coefficient: f32, min: f32, max: f32) -> f32 {
    (volume * coefficient).clamp(min, max)
}
