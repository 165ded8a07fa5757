//! Hole City - a hole-eats-the-city arcade game
//!
//! Core modules:
//! - `sim`: Deterministic core (world generation, consumption, growth, movement)
//! - `render`: Snapshot and buffer data handed to the rendering collaborator
//! - `config`: Data-driven game tuning
//! - `scoreboard`: Score sink for the HUD, best score per level

pub mod config;
pub mod render;
pub mod scoreboard;
pub mod sim;

pub use config::GameConfig;
pub use scoreboard::ScoreBoard;

use glam::{Vec2, Vec3};

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;
}

/// Horizontal (XZ-plane) distance of a point from the world origin
#[inline]
pub fn planar_distance(pos: Vec3) -> f32 {
    Vec2::new(pos.x, pos.z).length()
}

/// Wrap a coordinate into `[-half_extent, half_extent]`.
///
/// Crossing one edge reappears at the opposite edge, shifted by exactly the
/// full arena width.
#[inline]
pub fn wrap_coord(v: f32, half_extent: f32) -> f32 {
    if half_extent <= 0.0 || !v.is_finite() || (-half_extent..=half_extent).contains(&v) {
        return v;
    }
    (v + half_extent).rem_euclid(half_extent * 2.0) - half_extent
}
