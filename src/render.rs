//! Rendering collaborator boundary
//!
//! The renderer lives outside the crate (three.js on the web build). When a
//! level loads it receives a [`SceneSetup`] (theme and ground tiles). Each
//! frame it receives a [`RenderSnapshot`]: hole radius and growth progress,
//! camera, ground offset and one POD instance per live entity, plus ring
//! triangles for the hole rim and the progress band.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::Serialize;

use crate::sim::{GameState, GroundTile, Theme};

/// Position + colour vertex, triangles on the ground plane
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y, z],
            color,
        }
    }
}

/// One live entity as the renderer sees it
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EntityInstance {
    pub position: [f32; 3],
    pub yaw: f32,
    /// Footprint `w, h, d`
    pub size: [f32; 3],
    /// Index into [`RenderSnapshot::models`], stored as a float so the whole
    /// instance reads as one `Float32Array`
    pub model: f32,
}

/// Colors for the hole overlay
pub mod colors {
    pub const HOLE_RIM: [f32; 4] = [0.05, 0.05, 0.08, 1.0];
    pub const PROGRESS: [f32; 4] = [0.35, 0.85, 1.0, 0.9];
}

/// Rim of the hole, relative to its radius
pub const RIM_INNER: f32 = 1.0;
pub const RIM_OUTER: f32 = 1.18;
/// Growth progress band, relative to the hole radius
pub const PROGRESS_INNER: f32 = 1.25;
pub const PROGRESS_OUTER: f32 = 1.4;

/// Ring lying on the XZ plane, swept counter-clockwise from +X
///
/// `sweep` is in radians and clamped to a full turn. Returns two triangles per
/// segment; an empty list when there is nothing to draw.
pub fn ring_vertices(
    radius: f32,
    inner: f32,
    outer: f32,
    segments: u32,
    sweep: f32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let sweep = sweep.clamp(0.0, TAU);
    if segments == 0 || sweep <= 0.0 || radius <= 0.0 {
        return Vec::new();
    }
    let (r_in, r_out) = (radius * inner, radius * outer);
    let y = 0.02;
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * sweep;
        let theta2 = ((i + 1) as f32 / segments as f32) * sweep;
        let (s1, c1) = theta1.sin_cos();
        let (s2, c2) = theta2.sin_cos();

        let inner1 = Vertex::new(r_in * c1, y, r_in * s1, color);
        let outer1 = Vertex::new(r_out * c1, y, r_out * s1, color);
        let inner2 = Vertex::new(r_in * c2, y, r_in * s2, color);
        let outer2 = Vertex::new(r_out * c2, y, r_out * s2, color);

        vertices.extend_from_slice(&[inner1, outer1, inner2, inner2, outer1, outer2]);
    }

    vertices
}

/// Parse `#rrggbb` into linear RGBA
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| -> Option<f32> {
        let v = u8::from_str_radix(&hex[i..i + 2], 16).ok()?;
        Some(srgb_to_linear(f32::from(v) / 255.0))
    };
    Some([channel(0)?, channel(2)?, channel(4)?, 1.0])
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Static scene data for one level
///
/// Tile positions are at rest; the renderer shifts them by
/// [`RenderSnapshot::ground_offset`] every frame.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSetup<'a> {
    pub level_id: &'a str,
    pub level_name: &'a str,
    pub theme: &'a Theme,
    pub tile_size: f32,
    pub tiles: &'a [GroundTile],
}

impl<'a> SceneSetup<'a> {
    pub fn for_state(state: &'a GameState) -> Self {
        Self {
            level_id: &state.level.id,
            level_name: &state.level.name,
            theme: &state.level.theme,
            tile_size: state.level.grid.tile_size,
            tiles: &state.tiles,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub hole_radius: f32,
    /// `pending / need` in `[0, 1]`
    pub progress: f32,
    pub grow_level: u32,
    pub score: u64,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub fov_degrees: f32,
    /// Visual ground shift, wrapped to one tile
    pub ground_offset: [f32; 2],
    pub background: [f32; 4],
    pub models: Vec<String>,
    pub instances: Vec<EntityInstance>,
}

impl RenderSnapshot {
    /// Read the current frame out of `state`; eaten entities are skipped
    pub fn capture(state: &GameState) -> Self {
        let mut models: Vec<String> = Vec::new();
        let mut instances = Vec::with_capacity(state.remaining());

        for entity in state.live_entities() {
            let position = state.position_of(&entity.id).unwrap_or(entity.position);
            let model = match models.iter().position(|m| *m == entity.model) {
                Some(i) => i,
                None => {
                    models.push(entity.model.clone());
                    models.len() - 1
                }
            };
            let fp = entity.footprint;
            instances.push(EntityInstance {
                position: position.to_array(),
                yaw: entity.yaw,
                size: [fp.w, fp.h, fp.d],
                model: model as f32,
            });
        }

        let ground: Vec2 = state.movement.ground_offset();
        Self {
            hole_radius: state.hole_radius(),
            progress: state.growth.progress(),
            grow_level: state.growth.grow_level(),
            score: state.score,
            camera_position: state.camera.position.to_array(),
            camera_target: state.camera.target.to_array(),
            fov_degrees: state.camera.fov_degrees,
            ground_offset: ground.to_array(),
            background: parse_hex_color(&state.level.theme.background)
                .unwrap_or([0.0, 0.0, 0.0, 1.0]),
            models,
            instances,
        }
    }

    /// Hole rim plus the progress band swept over `progress * 2π`
    pub fn hole_overlay(&self, segments: u32) -> Vec<Vertex> {
        let mut vertices = ring_vertices(
            self.hole_radius,
            RIM_INNER,
            RIM_OUTER,
            segments,
            TAU,
            colors::HOLE_RIM,
        );
        vertices.extend(ring_vertices(
            self.hole_radius,
            PROGRESS_INNER,
            PROGRESS_OUTER,
            segments,
            self.progress * TAU,
            colors::PROGRESS,
        ));
        vertices
    }

    /// Instances as a flat float buffer for the JS side
    pub fn instance_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}
